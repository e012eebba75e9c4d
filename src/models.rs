//! Decode models for the unit REST API payloads.
//!
//! Every field defaults when absent so that sparse device responses decode
//! to zero values instead of failing the whole payload. The one exception
//! is [`SystemStatus::firmware`]: its absence marks the system decode as
//! incomplete, which the system stage reports through the info gauge.

use serde::Deserialize;

// --- system/status ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SystemStatus {
    pub cpu: Cpu,
    pub memory: Memory,
    pub firmware: Option<Firmware>,
    pub remote_management: RemoteManagement,
    pub upgrade_media_present: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Cpu {
    pub usage: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Memory {
    pub available: u64,
    pub total: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Firmware {
    pub running: FirmwareVersion,
    pub recovery: FirmwareVersion,
    pub default: FirmwareVersion,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FirmwareVersion {
    pub version: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RemoteManagement {
    pub bonding: ManagementBonding,
    pub connected: bool,
    pub address: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ManagementBonding {
    pub paths: Vec<ManagementBondingPath>,
}

/// One bonding path of the management connection. `network_interface` is a
/// full resource path like `/api/v1/units/D02018/network_interfaces/0`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ManagementBondingPath {
    pub network_interface: String,
    pub rtt: f64,
    pub rx_bitrate: i64,
    pub tx_bitrate: i64,
    pub health: String,
    pub silence_time: f64,
    pub via_https: bool,
}

// --- network_interfaces/status ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InterfacesStatus {
    pub status: Vec<InterfaceStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InterfaceStatus {
    pub ethernet: Ethernet,
    pub ip: IpAddress,
    pub rx_bitrate: f64,
    pub tx_bitrate: f64,
    pub internet_access: bool,
    pub testing_internet_access: bool,
    pub primary_interface: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Ethernet {
    /// MAC address.
    pub address: String,
    /// Link speed in bits per second, -1 if unknown.
    pub link: f64,
    pub duplex: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IpAddress {
    pub address: String,
    pub netmask: String,
}

// --- resource listings ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NetworkInputs {
    pub network_inputs: Vec<ResourceEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Encoders {
    pub encoders: Vec<ResourceEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoOutputs {
    pub video_outputs: Vec<ResourceEntry>,
}

/// Common listing entry shape shared by network inputs, encoders and video
/// outputs. `index` addresses the per-item status sub-resource.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResourceEntry {
    pub index: i64,
    pub name: String,
    pub description: String,
    pub active: bool,
}

// --- shared video/audio stream shapes ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoStream {
    pub format: VideoFormat,
    pub codec: VideoCodec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AudioStream {
    pub format: AudioFormat,
    pub codec: AudioCodec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoFormat {
    pub framerate: f64,
    pub width: i64,
    pub height: i64,
    pub bit_depth: i64,
    pub interlaced: bool,
    pub top_field_first: bool,
    pub forced_aspect: bool,
    pub chroma_subsampling: String,
    pub display_aspect: String,
    pub pixel_aspect: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoCodec {
    pub name: String,
    pub profile: String,
    pub level: String,
    pub bitrate: i64,
    pub adaptive_bitrate: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AudioFormat {
    pub sample_rate: i64,
    pub channels: i64,
    pub bit_depth: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AudioCodec {
    pub name: String,
    pub bitrate: i64,
    pub adaptive_bitrate: bool,
}

/// Video source section shared by encoder and video output status payloads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoSource {
    pub available: bool,
    pub video: VideoStream,
    pub audio: Vec<AudioStream>,
    pub source: String,
}

// --- network_inputs/{i}/status ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NetworkInputStatus {
    pub description: String,
    pub active: bool,
    pub network_source: NetworkSource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NetworkSource {
    pub programs: Vec<Program>,
    pub encrypted: bool,
    pub fec: Fec,
    pub bonding: InputBonding,
    pub bitrate: i64,
    pub source_type: String,
    pub address: String,
    pub sender: Sender,
    pub packet_loss: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Sender {
    pub serial: String,
    pub verified: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fec {
    pub buffer: f64,
    pub packet_loss: f64,
}

/// Bonding section of a network input. An empty `protocol` means bonding
/// is not in use for the input.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InputBonding {
    pub buffer: f64,
    pub protocol: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Program {
    pub video: VideoStream,
    pub audio: Vec<AudioStream>,
    pub number: i64,
    pub end_to_end_delay: EndToEndDelay,
    pub buffers: Buffers,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EndToEndDelay {
    pub delay: f64,
    pub target: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Buffers {
    pub reception: f64,
    pub target: f64,
    pub decoder: f64,
}

// --- encoders/{i}/status ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EncoderStatus {
    pub description: String,
    pub active: bool,
    pub video_source: VideoSource,
    pub encoding: Encoding,
    pub destinations: Destinations,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Encoding {
    pub video: VideoStream,
    pub audio: Vec<AudioStream>,
    pub total_bitrate: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Destinations {
    pub basic: Vec<BasicDestination>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BasicDestination {
    pub bitrate: f64,
    pub packet_loss: f64,
    pub udp_smoothing_buffer: f64,
    pub fec: FecStatus,
    pub bonding: DestinationBonding,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FecStatus {
    pub packet_loss: f64,
    pub bitrate_overhead: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DestinationBonding {
    pub destination: String,
    pub failover_active: bool,
    pub bitrate: f64,
    pub estimated_capacity: f64,
    pub paths: Vec<DestinationPath>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DestinationPath {
    pub destination: String,
    pub network_interface: String,
    pub latency: f64,
    pub latency_history: f64,
    pub viable: bool,
    pub bitrate: f64,
    pub packet_loss: f64,
    pub packet_loss_history: f64,
    pub estimated_capacity: f64,
    pub redundancy_bitrate: f64,
}

// --- video_outputs/{i}/status ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoOutputStatus {
    pub description: String,
    pub active: bool,
    pub video_source: VideoSource,
    pub video_out: VideoOut,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoOut {
    pub connector_name: String,
    pub video: VideoStream,
    pub audio: Vec<AudioStream>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_status_decodes_sparse_payload() {
        let status: SystemStatus = serde_json::from_str(r#"{"cpu":{"usage":42.5}}"#).unwrap();

        assert_eq!(status.cpu.usage, 42.5);
        assert_eq!(status.memory.total, 0);
        assert_eq!(status.memory.available, 0);
        assert!(status.firmware.is_none());
        assert!(status.remote_management.bonding.paths.is_empty());
    }

    #[test]
    fn system_status_decodes_firmware_section() {
        let status: SystemStatus = serde_json::from_str(
            r#"{
                "firmware": {
                    "running": {"version": "1.2.3"},
                    "recovery": {"version": "1.2.0"},
                    "default": {"version": "1.0.0"}
                }
            }"#,
        )
        .unwrap();

        let firmware = status.firmware.unwrap();
        assert_eq!(firmware.running.version, "1.2.3");
        assert_eq!(firmware.recovery.version, "1.2.0");
        assert_eq!(firmware.default.version, "1.0.0");
    }

    #[test]
    fn listing_ignores_unknown_fields() {
        let listing: NetworkInputs = serde_json::from_str(
            r#"{
                "network_inputs": [
                    {"index": 2, "name": "in2", "description": "Studio feed",
                     "active": true, "href": "/api/v1/units/D01234/network_inputs/2",
                     "_links": []}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(listing.network_inputs.len(), 1);
        assert_eq!(listing.network_inputs[0].index, 2);
        assert_eq!(listing.network_inputs[0].description, "Studio feed");
    }

    #[test]
    fn network_input_status_defaults_nested_sections() {
        let status: NetworkInputStatus =
            serde_json::from_str(r#"{"description": "feed", "active": true}"#).unwrap();

        assert!(status.active);
        assert!(status.network_source.programs.is_empty());
        assert_eq!(status.network_source.bonding.protocol, "");
    }
}
