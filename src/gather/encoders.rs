//! Encoder stage: input status, encoding configuration and per-destination
//! transmission statistics including bonding paths.

use std::time::Instant;

use prometheus::Registry;
use tracing::warn;

use super::GatherError;
use super::labels;
use crate::client::DeviceClient;
use crate::metrics::{GaugeSpec, bool_label, bool_value, interface_id, register_gauges};
use crate::models::{EncoderStatus, Encoders};

const ENCODER_VIDEO_CONFIG: &str = "encoder_video_config";
const ENCODER_AUDIO_CONFIG: &str = "encoder_audio_config";
const ENCODER_VIDEO_INPUT_STATUS: &str = "encoder_video_input_status";
const ENCODER_AUDIO_INPUT_STATUS: &str = "encoder_audio_input_status";
const ENCODER_TOTAL_BITRATE: &str = "encoder_total_bitrate_bits";
const ENCODER_DESTINATION_BITRATE: &str = "encoder_basic_destination_bitrate_bits";
const ENCODER_DESTINATION_PACKET_LOSS: &str = "encoder_basic_destination_packet_loss";
const ENCODER_DESTINATION_FEC_PACKET_LOSS: &str = "encoder_basic_destination_fec_packet_loss";
const ENCODER_DESTINATION_FEC_OVERHEAD: &str = "encoder_basic_destination_fec_bitrate_overhead";
const ENCODER_DESTINATION_UDP_SMOOTHING_BUFFER: &str =
    "encoder_basic_destination_udp_smoothing_buffer_seconds";
const ENCODER_DESTINATION_PATH_LATENCY: &str = "encoder_basic_destination_path_latency_seconds";
const ENCODER_DESTINATION_PATH_LATENCY_HISTORICAL: &str =
    "encoder_basic_destination_path_latency_historical_seconds";
const ENCODER_DESTINATION_PATH_VIABLE: &str = "encoder_basic_destination_path_viable";
const ENCODER_DESTINATION_PATH_BITRATE: &str = "encoder_basic_destination_path_bitrate_bits";
const ENCODER_DESTINATION_PATH_PACKET_LOSS: &str = "encoder_basic_destination_path_packet_loss";
const ENCODER_DESTINATION_PATH_PACKET_LOSS_HISTORICAL: &str =
    "encoder_basic_destination_path_packet_loss_historical";
const ENCODER_DESTINATION_PATH_CAPACITY: &str =
    "encoder_basic_destination_path_estimated_capacity_bits";
const ENCODER_DESTINATION_PATH_REDUNDANCY: &str =
    "encoder_basic_destination_path_redundancy_bitrate_bits";
const ENCODER_DESTINATION_FAILOVER_ACTIVE: &str = "encoder_basic_destination_failover_active";

const DESTINATION_LABELS: &[&str] = &[
    labels::ENCODER_INDEX,
    labels::ENCODER_NAME,
    labels::DESTINATION,
    labels::DESTINATION_INDEX,
];

const PATH_LABELS: &[&str] = &[
    labels::ENCODER_INDEX,
    labels::ENCODER_NAME,
    labels::BONDING_DESTINATION,
    labels::DESTINATION,
    labels::DESTINATION_INDEX,
    labels::NETWORK_INTERFACE,
];

const SPECS: &[GaugeSpec] = &[
    GaugeSpec {
        name: ENCODER_VIDEO_INPUT_STATUS,
        help: "Video input and encoding status. Value is 1 if source is available, 0 otherwise. Encoding and format info are exposed as labels.",
        labels: &[
            labels::ENCODER_INDEX,
            labels::ENCODER_NAME,
            labels::FRAMERATE,
            labels::WIDTH,
            labels::HEIGHT,
            labels::BIT_DEPTH,
            labels::INTERLACED,
            labels::TOP_FIELD_FIRST,
            labels::CHROMA_SUBSAMPLING,
            labels::DISPLAY_ASPECT,
            labels::PIXEL_ASPECT,
            labels::FORCED_ASPECT,
        ],
    },
    GaugeSpec {
        name: ENCODER_AUDIO_INPUT_STATUS,
        help: "Audio encoding status. Value is 1 if source is available, 0 otherwise. Audio properties are in labels.",
        labels: &[
            labels::ENCODER_INDEX,
            labels::ENCODER_NAME,
            labels::CODEC,
            labels::AUDIO_SAMPLE_RATE,
            labels::AUDIO_CHANNELS,
        ],
    },
    GaugeSpec {
        name: ENCODER_VIDEO_CONFIG,
        help: "Video encoder configuration. Exposes all static and configured parameters as labels. Value always 1 if encoder is active.",
        labels: &[
            labels::ENCODER_INDEX,
            labels::ENCODER_NAME,
            labels::CODEC,
            labels::PROFILE,
            labels::CODEC_LEVEL,
            labels::TARGET_BITRATE,
            labels::FRAMERATE,
            labels::WIDTH,
            labels::HEIGHT,
            labels::BIT_DEPTH,
            labels::INTERLACED,
            labels::TOP_FIELD_FIRST,
            labels::CHROMA_SUBSAMPLING,
            labels::DISPLAY_ASPECT,
            labels::PIXEL_ASPECT,
            labels::FORCED_ASPECT,
        ],
    },
    GaugeSpec {
        name: ENCODER_AUDIO_CONFIG,
        help: "Audio encoder configuration. Exposes all static and configured parameters as labels. Value always 1 if encoder is active.",
        labels: &[
            labels::ENCODER_INDEX,
            labels::ENCODER_NAME,
            labels::AUDIO_INDEX,
            labels::CODEC,
            labels::TARGET_BITRATE,
            labels::AUDIO_SAMPLE_RATE,
            labels::AUDIO_CHANNELS,
        ],
    },
    GaugeSpec {
        name: ENCODER_TOTAL_BITRATE,
        help: "Total encoder bitrate in bits per second (sum of video and audio streams).",
        labels: &[labels::ENCODER_INDEX, labels::ENCODER_NAME],
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_BITRATE,
        help: "Output bitrate to a destination in bits per second.",
        labels: DESTINATION_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_PACKET_LOSS,
        help: "Overall packet loss ratio for a destination (0-1).",
        labels: DESTINATION_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_FEC_PACKET_LOSS,
        help: "FEC packet loss for a destination (fractional).",
        labels: DESTINATION_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_FEC_OVERHEAD,
        help: "FEC bitrate overhead ratio for a destination (fractional).",
        labels: DESTINATION_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_UDP_SMOOTHING_BUFFER,
        help: "UDP smoothing buffer duration for a destination in seconds.",
        labels: DESTINATION_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_PATH_LATENCY,
        help: "Current latency in seconds for a destination path.",
        labels: PATH_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_PATH_LATENCY_HISTORICAL,
        help: "Historical average latency in seconds for a destination path.",
        labels: PATH_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_PATH_VIABLE,
        help: "1 if the destination path is viable, 0 otherwise.",
        labels: PATH_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_PATH_BITRATE,
        help: "Current bitrate on a specific destination path (bits per second).",
        labels: PATH_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_PATH_PACKET_LOSS,
        help: "Current packet loss ratio (0-1) on a destination path.",
        labels: PATH_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_PATH_PACKET_LOSS_HISTORICAL,
        help: "Historical average packet loss ratio (0-1) on a destination path.",
        labels: PATH_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_PATH_CAPACITY,
        help: "Estimated capacity in bits per second for a destination path.",
        labels: PATH_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_PATH_REDUNDANCY,
        help: "Configured redundancy bitrate for a destination path (bits per second).",
        labels: PATH_LABELS,
    },
    GaugeSpec {
        name: ENCODER_DESTINATION_FAILOVER_ACTIVE,
        help: "1 if failover is active for a destination, 0 otherwise.",
        labels: DESTINATION_LABELS,
    },
];

pub(super) async fn gather(
    client: &DeviceClient,
    registry: &Registry,
    serial: &str,
    deadline: Instant,
) -> Result<(), GatherError> {
    let body = client.fetch(serial, "encoders", deadline).await?;
    let listing: Encoders = serde_json::from_slice(&body)?;

    let gauges = register_gauges(registry, SPECS)?;

    for encoder in &listing.encoders {
        let status = match fetch_status(client, serial, encoder.index, deadline).await {
            Ok(status) => status,
            Err(err) => {
                warn!(encoder_index = encoder.index, error = %err, "Error getting encoder status, skipping");
                continue;
            }
        };

        let encoder_idx = encoder.index.to_string();
        let name = status.description.as_str();

        let source = &status.video_source;
        gauges[ENCODER_VIDEO_INPUT_STATUS]
            .with_label_values(&[
                &encoder_idx,
                name,
                &format!("{:.2}", source.video.format.framerate),
                &source.video.format.width.to_string(),
                &source.video.format.height.to_string(),
                &source.video.format.bit_depth.to_string(),
                bool_label(source.video.format.interlaced),
                bool_label(source.video.format.top_field_first),
                &source.video.format.chroma_subsampling,
                &source.video.format.display_aspect,
                &source.video.format.pixel_aspect,
                bool_label(source.video.format.forced_aspect),
            ])
            .set(bool_value(source.available));

        for audio in &source.audio {
            gauges[ENCODER_AUDIO_INPUT_STATUS]
                .with_label_values(&[
                    &encoder_idx,
                    name,
                    &audio.codec.name,
                    &audio.format.sample_rate.to_string(),
                    &audio.format.channels.to_string(),
                ])
                .set(bool_value(source.available));
        }

        let encoding = &status.encoding;
        gauges[ENCODER_VIDEO_CONFIG]
            .with_label_values(&[
                &encoder_idx,
                name,
                &encoding.video.codec.name,
                &encoding.video.codec.profile,
                &encoding.video.codec.level,
                &encoding.video.codec.bitrate.to_string(),
                &format!("{:.2}", encoding.video.format.framerate),
                &encoding.video.format.width.to_string(),
                &encoding.video.format.height.to_string(),
                &encoding.video.format.bit_depth.to_string(),
                bool_label(encoding.video.format.interlaced),
                bool_label(encoding.video.format.top_field_first),
                &encoding.video.format.chroma_subsampling,
                &encoding.video.format.display_aspect,
                &encoding.video.format.pixel_aspect,
                bool_label(encoding.video.format.forced_aspect),
            ])
            .set(bool_value(status.active));

        for (audio_idx, audio) in encoding.audio.iter().enumerate() {
            gauges[ENCODER_AUDIO_CONFIG]
                .with_label_values(&[
                    &encoder_idx,
                    name,
                    &audio_idx.to_string(),
                    &audio.codec.name,
                    &audio.codec.bitrate.to_string(),
                    &audio.format.sample_rate.to_string(),
                    &audio.format.channels.to_string(),
                ])
                .set(bool_value(status.active));
        }

        gauges[ENCODER_TOTAL_BITRATE]
            .with_label_values(&[&encoder_idx, name])
            .set(encoding.total_bitrate);

        for (destination_idx, basic) in status.destinations.basic.iter().enumerate() {
            let destination_idx = destination_idx.to_string();
            let bonding_destination = basic.bonding.destination.as_str();

            gauges[ENCODER_DESTINATION_BITRATE]
                .with_label_values(&[&encoder_idx, name, bonding_destination, &destination_idx])
                .set(basic.bitrate);
            gauges[ENCODER_DESTINATION_PACKET_LOSS]
                .with_label_values(&[&encoder_idx, name, bonding_destination, &destination_idx])
                .set(basic.packet_loss);
            gauges[ENCODER_DESTINATION_FEC_PACKET_LOSS]
                .with_label_values(&[&encoder_idx, name, bonding_destination, &destination_idx])
                .set(basic.fec.packet_loss);
            gauges[ENCODER_DESTINATION_FEC_OVERHEAD]
                .with_label_values(&[&encoder_idx, name, bonding_destination, &destination_idx])
                .set(basic.fec.bitrate_overhead);
            gauges[ENCODER_DESTINATION_UDP_SMOOTHING_BUFFER]
                .with_label_values(&[&encoder_idx, name, bonding_destination, &destination_idx])
                .set(basic.udp_smoothing_buffer);
            gauges[ENCODER_DESTINATION_FAILOVER_ACTIVE]
                .with_label_values(&[&encoder_idx, name, bonding_destination, &destination_idx])
                .set(bool_value(basic.bonding.failover_active));

            for path in &basic.bonding.paths {
                let path_labels: [&str; 6] = [
                    &encoder_idx,
                    name,
                    bonding_destination,
                    path.destination.as_str(),
                    &destination_idx,
                    interface_id(&path.network_interface),
                ];
                gauges[ENCODER_DESTINATION_PATH_LATENCY]
                    .with_label_values(&path_labels)
                    .set(path.latency);
                gauges[ENCODER_DESTINATION_PATH_LATENCY_HISTORICAL]
                    .with_label_values(&path_labels)
                    .set(path.latency_history);
                gauges[ENCODER_DESTINATION_PATH_VIABLE]
                    .with_label_values(&path_labels)
                    .set(bool_value(path.viable));
                gauges[ENCODER_DESTINATION_PATH_BITRATE]
                    .with_label_values(&path_labels)
                    .set(path.bitrate);
                gauges[ENCODER_DESTINATION_PATH_PACKET_LOSS]
                    .with_label_values(&path_labels)
                    .set(path.packet_loss);
                gauges[ENCODER_DESTINATION_PATH_PACKET_LOSS_HISTORICAL]
                    .with_label_values(&path_labels)
                    .set(path.packet_loss_history);
                gauges[ENCODER_DESTINATION_PATH_CAPACITY]
                    .with_label_values(&path_labels)
                    .set(path.estimated_capacity);
                gauges[ENCODER_DESTINATION_PATH_REDUNDANCY]
                    .with_label_values(&path_labels)
                    .set(path.redundancy_bitrate);
            }
        }
    }

    Ok(())
}

async fn fetch_status(
    client: &DeviceClient,
    serial: &str,
    index: i64,
    deadline: Instant,
) -> Result<EncoderStatus, GatherError> {
    let body = client
        .fetch(serial, &format!("encoders/{index}/status"), deadline)
        .await?;
    Ok(serde_json::from_slice(&body)?)
}
