//! Network input stage: receive status for each configured input, its
//! programs and audio tracks.

use std::time::Instant;

use prometheus::Registry;
use tracing::warn;

use super::GatherError;
use super::labels;
use crate::client::DeviceClient;
use crate::metrics::{GaugeSpec, bool_label, bool_value, register_gauges};
use crate::models::{NetworkInputStatus, NetworkInputs};

const NETWORK_INPUT_VIDEO_STATUS: &str = "network_input_video_status";
const NETWORK_INPUT_AUDIO_STATUS: &str = "network_input_audio_status";
const NETWORK_INPUT_VIDEO_BITRATE: &str = "network_input_video_bitrate";
const NETWORK_INPUT_BITRATE: &str = "network_input_bitrate";
const NETWORK_INPUT_PACKET_LOSS: &str = "network_input_packet_loss";
const NETWORK_INPUT_END_TO_END_DELAY: &str = "network_input_end_to_end_delay_seconds";
const NETWORK_INPUT_BUFFERS_RECEPTION: &str = "network_input_buffers_reception_seconds";
const NETWORK_INPUT_BUFFERS_DECODER: &str = "network_input_buffers_decoder_seconds";
const NETWORK_INPUT_BUFFERS_TARGET: &str = "network_input_buffers_target_seconds";
const NETWORK_INPUT_FEC_BUFFER: &str = "network_input_fec_buffer_seconds";
const NETWORK_INPUT_FEC_PACKET_LOSS: &str = "network_input_fec_packet_loss";
const NETWORK_INPUT_BONDING_BUFFER: &str = "network_input_bonding_buffer_seconds";
const NETWORK_INPUT_ACTIVE: &str = "network_input_active";

const SPECS: &[GaugeSpec] = &[
    GaugeSpec {
        name: NETWORK_INPUT_VIDEO_STATUS,
        help: "Video input status (1=active, 0=inactive)",
        labels: &[
            labels::INPUT_INDEX,
            labels::INPUT_NAME,
            labels::CODEC,
            labels::PROFILE,
            labels::CODEC_LEVEL,
            labels::CHROMA_SUBSAMPLING,
            labels::FRAMERATE,
            labels::WIDTH,
            labels::HEIGHT,
            labels::BIT_DEPTH,
            labels::INTERLACED,
            labels::TOP_FIELD_FIRST,
            labels::DISPLAY_ASPECT,
            labels::PIXEL_ASPECT,
            labels::FORCED_ASPECT,
            labels::PROGRAM_INDEX,
        ],
    },
    GaugeSpec {
        name: NETWORK_INPUT_AUDIO_STATUS,
        help: "Audio input status (1=active, 0=inactive)",
        labels: &[
            labels::INPUT_INDEX,
            labels::INPUT_NAME,
            labels::CODEC,
            labels::CHANNELS,
            labels::SAMPLE_RATE,
            labels::BIT_DEPTH,
            labels::PROGRAM_INDEX,
            labels::AUDIO_INDEX,
        ],
    },
    GaugeSpec {
        name: NETWORK_INPUT_VIDEO_BITRATE,
        help: "Video codec bitrate in bits per second",
        labels: &[labels::INPUT_INDEX, labels::INPUT_NAME, labels::PROGRAM_INDEX],
    },
    GaugeSpec {
        name: NETWORK_INPUT_BITRATE,
        help: "Total network input bitrate in bits per second",
        labels: &[
            labels::INPUT_INDEX,
            labels::INPUT_NAME,
            labels::SOURCE_TYPE,
            labels::SENDER_SERIAL,
        ],
    },
    GaugeSpec {
        name: NETWORK_INPUT_PACKET_LOSS,
        help: "Network input packet loss",
        labels: &[labels::INPUT_INDEX, labels::INPUT_NAME],
    },
    GaugeSpec {
        name: NETWORK_INPUT_END_TO_END_DELAY,
        help: "End-to-end delay for the input in seconds",
        labels: &[
            labels::INPUT_INDEX,
            labels::INPUT_NAME,
            labels::PROGRAM_INDEX,
            labels::TARGET,
        ],
    },
    GaugeSpec {
        name: NETWORK_INPUT_BUFFERS_RECEPTION,
        help: "Reception buffer duration in seconds",
        labels: &[labels::INPUT_INDEX, labels::INPUT_NAME, labels::PROGRAM_INDEX],
    },
    GaugeSpec {
        name: NETWORK_INPUT_BUFFERS_DECODER,
        help: "Decoder buffer duration in seconds",
        labels: &[labels::INPUT_INDEX, labels::INPUT_NAME, labels::PROGRAM_INDEX],
    },
    GaugeSpec {
        name: NETWORK_INPUT_BUFFERS_TARGET,
        help: "Target buffer duration in seconds",
        labels: &[labels::INPUT_INDEX, labels::INPUT_NAME, labels::PROGRAM_INDEX],
    },
    GaugeSpec {
        name: NETWORK_INPUT_FEC_BUFFER,
        help: "FEC buffer duration in seconds",
        labels: &[labels::INPUT_INDEX, labels::INPUT_NAME, labels::PROGRAM_INDEX],
    },
    GaugeSpec {
        name: NETWORK_INPUT_FEC_PACKET_LOSS,
        help: "FEC packet loss",
        labels: &[labels::INPUT_INDEX, labels::INPUT_NAME, labels::PROGRAM_INDEX],
    },
    GaugeSpec {
        name: NETWORK_INPUT_BONDING_BUFFER,
        help: "Bonding buffer duration in seconds",
        labels: &[labels::INPUT_INDEX, labels::INPUT_NAME, labels::PROTOCOL],
    },
    GaugeSpec {
        name: NETWORK_INPUT_ACTIVE,
        help: "Indicates if the network input is active (1=active, 0=inactive)",
        labels: &[
            labels::INPUT_INDEX,
            labels::INPUT_NAME,
            labels::SOURCE_TYPE,
            labels::ADDRESS,
            labels::SENDER_SERIAL,
            labels::SENDER_VERIFIED,
        ],
    },
];

pub(super) async fn gather(
    client: &DeviceClient,
    registry: &Registry,
    serial: &str,
    deadline: Instant,
) -> Result<(), GatherError> {
    let body = client.fetch(serial, "network_inputs", deadline).await?;
    let listing: NetworkInputs = serde_json::from_slice(&body)?;

    let gauges = register_gauges(registry, SPECS)?;

    for input in &listing.network_inputs {
        let status = match fetch_status(client, serial, input.index, deadline).await {
            Ok(status) => status,
            Err(err) => {
                warn!(input_index = input.index, error = %err, "Error getting network input status, skipping");
                continue;
            }
        };

        let input_idx = input.index.to_string();
        let name = status.description.as_str();
        let source = &status.network_source;

        gauges[NETWORK_INPUT_ACTIVE]
            .with_label_values(&[
                &input_idx,
                name,
                &source.source_type,
                &source.address,
                &source.sender.serial,
                bool_label(source.sender.verified),
            ])
            .set(bool_value(status.active));

        gauges[NETWORK_INPUT_BITRATE]
            .with_label_values(&[&input_idx, name, &source.source_type, &source.sender.serial])
            .set(source.bitrate as f64);

        gauges[NETWORK_INPUT_PACKET_LOSS]
            .with_label_values(&[&input_idx, name])
            .set(source.packet_loss);

        gauges[NETWORK_INPUT_FEC_BUFFER]
            .with_label_values(&[&input_idx, name, "0"])
            .set(source.fec.buffer);
        gauges[NETWORK_INPUT_FEC_PACKET_LOSS]
            .with_label_values(&[&input_idx, name, "0"])
            .set(source.fec.packet_loss);

        if !source.bonding.protocol.is_empty() {
            gauges[NETWORK_INPUT_BONDING_BUFFER]
                .with_label_values(&[&input_idx, name, &source.bonding.protocol])
                .set(source.bonding.buffer);
        }

        for (program_idx, program) in source.programs.iter().enumerate() {
            let program_idx = program_idx.to_string();

            let video = &program.video;
            gauges[NETWORK_INPUT_VIDEO_STATUS]
                .with_label_values(&[
                    &input_idx,
                    name,
                    &video.codec.name,
                    &video.codec.profile,
                    &video.codec.level,
                    &video.format.chroma_subsampling,
                    &format!("{:.2}", video.format.framerate),
                    &video.format.width.to_string(),
                    &video.format.height.to_string(),
                    &video.format.bit_depth.to_string(),
                    bool_label(video.format.interlaced),
                    bool_label(video.format.top_field_first),
                    &video.format.display_aspect,
                    &video.format.pixel_aspect,
                    bool_label(video.format.forced_aspect),
                    &program_idx,
                ])
                .set(bool_value(status.active));

            gauges[NETWORK_INPUT_VIDEO_BITRATE]
                .with_label_values(&[&input_idx, name, &program_idx])
                .set(video.codec.bitrate as f64);

            for (audio_idx, audio) in program.audio.iter().enumerate() {
                gauges[NETWORK_INPUT_AUDIO_STATUS]
                    .with_label_values(&[
                        &input_idx,
                        name,
                        &audio.codec.name,
                        &audio.format.channels.to_string(),
                        &audio.format.sample_rate.to_string(),
                        &audio.format.bit_depth.to_string(),
                        &program_idx,
                        &audio_idx.to_string(),
                    ])
                    .set(bool_value(status.active));
            }

            gauges[NETWORK_INPUT_BUFFERS_RECEPTION]
                .with_label_values(&[&input_idx, name, &program_idx])
                .set(program.buffers.reception);
            gauges[NETWORK_INPUT_BUFFERS_DECODER]
                .with_label_values(&[&input_idx, name, &program_idx])
                .set(program.buffers.decoder);
            gauges[NETWORK_INPUT_BUFFERS_TARGET]
                .with_label_values(&[&input_idx, name, &program_idx])
                .set(program.buffers.target);

            gauges[NETWORK_INPUT_END_TO_END_DELAY]
                .with_label_values(&[
                    &input_idx,
                    name,
                    &program_idx,
                    &format!("{:.4}", program.end_to_end_delay.target),
                ])
                .set(program.end_to_end_delay.delay);
        }
    }

    Ok(())
}

async fn fetch_status(
    client: &DeviceClient,
    serial: &str,
    index: i64,
    deadline: Instant,
) -> Result<NetworkInputStatus, GatherError> {
    let body = client
        .fetch(serial, &format!("network_inputs/{index}/status"), deadline)
        .await?;
    Ok(serde_json::from_slice(&body)?)
}
