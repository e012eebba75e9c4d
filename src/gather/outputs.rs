//! Video output stage: output activity and source availability with the
//! full video/audio format as labels.

use std::time::Instant;

use prometheus::Registry;
use tracing::warn;

use super::GatherError;
use super::labels;
use crate::client::DeviceClient;
use crate::metrics::{GaugeSpec, bool_label, bool_value, register_gauges};
use crate::models::{VideoOutputStatus, VideoOutputs};

const OUTPUT_VIDEO_ACTIVE: &str = "output_video_active";
const OUTPUT_AUDIO_ACTIVE: &str = "output_audio_active";
const OUTPUT_VIDEO_SOURCE_AVAILABLE: &str = "output_video_source_available";
const OUTPUT_AUDIO_SOURCE_AVAILABLE: &str = "output_audio_source_available";

const SPECS: &[GaugeSpec] = &[
    GaugeSpec {
        name: OUTPUT_VIDEO_ACTIVE,
        help: "Indicates if the video output is active (1=active, 0=inactive) with video format properties as labels",
        labels: &[
            labels::OUTPUT_INDEX,
            labels::OUTPUT_NAME,
            labels::WIDTH,
            labels::HEIGHT,
            labels::FRAMERATE,
            labels::BIT_DEPTH,
            labels::INTERLACED,
            labels::CHROMA_SUBSAMPLING,
            labels::PIXEL_ASPECT,
            labels::DISPLAY_ASPECT,
            labels::TOP_FIELD_FIRST,
        ],
    },
    GaugeSpec {
        name: OUTPUT_AUDIO_ACTIVE,
        help: "Indicates if the audio output is active (1=active, 0=inactive) with audio format properties as labels",
        labels: &[
            labels::OUTPUT_INDEX,
            labels::OUTPUT_NAME,
            labels::AUDIO_INDEX,
            labels::AUDIO_CHANNELS,
            labels::AUDIO_SAMPLE_RATE,
            labels::AUDIO_BIT_DEPTH,
        ],
    },
    GaugeSpec {
        name: OUTPUT_VIDEO_SOURCE_AVAILABLE,
        help: "Indicates if the video source is available (1=active, 0=inactive) with video format properties as labels",
        labels: &[
            labels::SOURCE_INDEX,
            labels::SOURCE_NAME,
            labels::CODEC_NAME,
            labels::CODEC_BITRATE,
            labels::PROFILE,
            labels::LEVEL,
            labels::WIDTH,
            labels::HEIGHT,
            labels::FRAMERATE,
            labels::BIT_DEPTH,
            labels::INTERLACED,
            labels::CHROMA_SUBSAMPLING,
            labels::PIXEL_ASPECT,
            labels::DISPLAY_ASPECT,
            labels::TOP_FIELD_FIRST,
        ],
    },
    GaugeSpec {
        name: OUTPUT_AUDIO_SOURCE_AVAILABLE,
        help: "Indicates if the audio source is available (1=active, 0=inactive) with audio format properties as labels",
        labels: &[
            labels::SOURCE_INDEX,
            labels::SOURCE_NAME,
            labels::AUDIO_INDEX,
            labels::AUDIO_CODEC_NAME,
            labels::AUDIO_CHANNELS,
            labels::AUDIO_SAMPLE_RATE,
            labels::AUDIO_BIT_DEPTH,
        ],
    },
];

pub(super) async fn gather(
    client: &DeviceClient,
    registry: &Registry,
    serial: &str,
    deadline: Instant,
) -> Result<(), GatherError> {
    let body = client.fetch(serial, "video_outputs", deadline).await?;
    let listing: VideoOutputs = serde_json::from_slice(&body)?;

    let gauges = register_gauges(registry, SPECS)?;

    for output in &listing.video_outputs {
        let status = match fetch_status(client, serial, output.index, deadline).await {
            Ok(status) => status,
            Err(err) => {
                warn!(output_index = output.index, error = %err, "Error getting video output status, skipping");
                continue;
            }
        };

        let output_idx = output.index.to_string();
        let name = output.description.as_str();

        let out_format = &status.video_out.video.format;
        gauges[OUTPUT_VIDEO_ACTIVE]
            .with_label_values(&[
                &output_idx,
                name,
                &out_format.width.to_string(),
                &out_format.height.to_string(),
                &format!("{:.2}", out_format.framerate),
                &out_format.bit_depth.to_string(),
                bool_label(out_format.interlaced),
                &out_format.chroma_subsampling,
                &out_format.pixel_aspect,
                &out_format.display_aspect,
                bool_label(out_format.top_field_first),
            ])
            .set(bool_value(status.active));

        for (audio_idx, audio) in status.video_out.audio.iter().enumerate() {
            gauges[OUTPUT_AUDIO_ACTIVE]
                .with_label_values(&[
                    &output_idx,
                    name,
                    &audio_idx.to_string(),
                    &audio.format.channels.to_string(),
                    &audio.format.sample_rate.to_string(),
                    &audio.format.bit_depth.to_string(),
                ])
                .set(bool_value(status.active));
        }

        let source = &status.video_source;
        gauges[OUTPUT_VIDEO_SOURCE_AVAILABLE]
            .with_label_values(&[
                &output_idx,
                name,
                &source.video.codec.name,
                &source.video.codec.bitrate.to_string(),
                &source.video.codec.profile,
                &source.video.codec.level,
                &source.video.format.width.to_string(),
                &source.video.format.height.to_string(),
                &format!("{:.2}", source.video.format.framerate),
                &source.video.format.bit_depth.to_string(),
                bool_label(source.video.format.interlaced),
                &source.video.format.chroma_subsampling,
                &source.video.format.pixel_aspect,
                &source.video.format.display_aspect,
                bool_label(source.video.format.top_field_first),
            ])
            .set(bool_value(source.available));

        for (audio_idx, audio) in status.video_out.audio.iter().enumerate() {
            gauges[OUTPUT_AUDIO_SOURCE_AVAILABLE]
                .with_label_values(&[
                    &output_idx,
                    name,
                    &audio_idx.to_string(),
                    &audio.codec.name,
                    &audio.format.channels.to_string(),
                    &audio.format.sample_rate.to_string(),
                    &audio.format.bit_depth.to_string(),
                ])
                .set(bool_value(source.available));
        }
    }

    Ok(())
}

async fn fetch_status(
    client: &DeviceClient,
    serial: &str,
    index: i64,
    deadline: Instant,
) -> Result<VideoOutputStatus, GatherError> {
    let body = client
        .fetch(serial, &format!("video_outputs/{index}/status"), deadline)
        .await?;
    Ok(serde_json::from_slice(&body)?)
}
