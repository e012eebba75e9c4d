//! Label names shared across the gatherer stage tables.
//!
//! These strings are part of the exposed metrics contract; downstream
//! dashboards join on them, so they are kept verbatim.

// System stage
pub const ACTIVE_FIRMWARE_VERSION: &str = "active_firmware_version";
pub const BACKUP_FIRMWARE_VERSION: &str = "backup_firmware_verison";
pub const DEFAULT_FIRMWARE_VERSION: &str = "default_firmware_version";
pub const NETWORK_INTERFACE: &str = "network_interface";

// Interface stage
pub const INTERFACE_MAC: &str = "interface_mac";
pub const IP_ADDRESS: &str = "ip_address";
pub const PRIMARY_INTERFACE: &str = "primary_interface";

// Network input stage
pub const INPUT_INDEX: &str = "input_index";
pub const INPUT_NAME: &str = "input_name";
pub const CODEC: &str = "codec";
pub const CODEC_LEVEL: &str = "codec_level";
pub const SOURCE_TYPE: &str = "source_type";
pub const TARGET: &str = "target";
pub const PROTOCOL: &str = "protocol";
pub const PROGRAM_INDEX: &str = "program_number";
pub const ADDRESS: &str = "address";
pub const SENDER_SERIAL: &str = "sender_serial";
pub const SENDER_VERIFIED: &str = "sender_verified";
pub const CHANNELS: &str = "channels";
pub const SAMPLE_RATE: &str = "sample_rate";

// Encoder stage
pub const ENCODER_INDEX: &str = "encoder_index";
pub const ENCODER_NAME: &str = "encoder_name";
pub const DESTINATION: &str = "destination";
pub const DESTINATION_INDEX: &str = "destination_index";
pub const BONDING_DESTINATION: &str = "bonding_destination";
pub const TARGET_BITRATE: &str = "target_bitrate";
pub const CODEC_NAME: &str = "codec_name";
pub const CODEC_BITRATE: &str = "codec_bitrate";
pub const PROFILE: &str = "profile";
pub const LEVEL: &str = "level";

// Video format labels
pub const INTERLACED: &str = "interlaced";
pub const CHROMA_SUBSAMPLING: &str = "chroma_subsampling";
pub const FRAMERATE: &str = "framerate";
pub const BIT_DEPTH: &str = "bit_depth";
pub const DISPLAY_ASPECT: &str = "display_aspect";
pub const PIXEL_ASPECT: &str = "pixel_aspect";
pub const FORCED_ASPECT: &str = "forced_aspect";
pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const TOP_FIELD_FIRST: &str = "top_field_first";

// Output stage
pub const OUTPUT_INDEX: &str = "output_index";
pub const OUTPUT_NAME: &str = "output_name";
pub const SOURCE_INDEX: &str = "source_index";
pub const SOURCE_NAME: &str = "source_name";
pub const AUDIO_INDEX: &str = "audio_index";
pub const AUDIO_CODEC_NAME: &str = "audio_codec_name";
pub const AUDIO_CHANNELS: &str = "audio_channels";
pub const AUDIO_SAMPLE_RATE: &str = "audio_sample_rate";
pub const AUDIO_BIT_DEPTH: &str = "audio_bit_depth";
