//! System status stage: CPU, memory, firmware and management bonding.

use std::time::Instant;

use prometheus::Registry;
use tracing::trace;

use super::GatherError;
use super::labels;
use crate::client::DeviceClient;
use crate::metrics::{GaugeSpec, bool_value, health_value, interface_id, register_gauges};
use crate::models::SystemStatus;

const SYSTEM_INFO: &str = "system_info";
const CPU_UTILISATION_PERCENT: &str = "cpu_utilisation_percent";
const MEMORY_TOTAL_BYTES: &str = "memory_total_bytes";
const MEMORY_AVAILABLE_BYTES: &str = "memory_available_bytes";
const BONDING_PATH_RTT_SECONDS: &str = "bonding_path_rtt_seconds";
const BONDING_PATH_RX_BITRATE: &str = "bonding_path_rx_bitrate_bytes_per_second";
const BONDING_PATH_TX_BITRATE: &str = "bonding_path_tx_bitrate_bytes_per_second";
const BONDING_PATH_HEALTH: &str = "bonding_path_health";

const SPECS: &[GaugeSpec] = &[
    GaugeSpec {
        name: SYSTEM_INFO,
        help: "Provides informtion on system uptime and statistics",
        labels: &[
            labels::ACTIVE_FIRMWARE_VERSION,
            labels::BACKUP_FIRMWARE_VERSION,
            labels::DEFAULT_FIRMWARE_VERSION,
        ],
    },
    GaugeSpec {
        name: CPU_UTILISATION_PERCENT,
        help: "Percentage of CPU utilisation",
        labels: &[],
    },
    GaugeSpec {
        name: MEMORY_TOTAL_BYTES,
        help: "Total amount of memory in bytes",
        labels: &[],
    },
    GaugeSpec {
        name: MEMORY_AVAILABLE_BYTES,
        help: "Amount of memory available in bytes",
        labels: &[],
    },
    GaugeSpec {
        name: BONDING_PATH_RTT_SECONDS,
        help: "Round trip time in seconds for bonding path",
        labels: &[labels::NETWORK_INTERFACE],
    },
    GaugeSpec {
        name: BONDING_PATH_RX_BITRATE,
        help: "Receive bitrate in bytes per second for bonding path",
        labels: &[labels::NETWORK_INTERFACE],
    },
    GaugeSpec {
        name: BONDING_PATH_TX_BITRATE,
        help: "Transmit bitrate in bytes per second for bonding path",
        labels: &[labels::NETWORK_INTERFACE],
    },
    GaugeSpec {
        name: BONDING_PATH_HEALTH,
        help: "Network management bonding path health",
        labels: &[labels::NETWORK_INTERFACE],
    },
];

pub(super) async fn gather(
    client: &DeviceClient,
    registry: &Registry,
    serial: &str,
    deadline: Instant,
) -> Result<(), GatherError> {
    let gauges = register_gauges(registry, SPECS)?;

    let mut info = SystemStatus::default();
    let result = match client.fetch(serial, "system/status", deadline).await {
        Ok(body) => match serde_json::from_slice::<SystemStatus>(&body) {
            Ok(decoded) => {
                info = decoded;
                Ok(())
            }
            Err(err) => Err(GatherError::from(err)),
        },
        Err(err) => Err(GatherError::from(err)),
    };

    if result.is_ok() {
        trace!("Successfully retrieved metrics for system status");
        gauges[CPU_UTILISATION_PERCENT]
            .with_label_values(&[])
            .set(info.cpu.usage);
        gauges[MEMORY_AVAILABLE_BYTES]
            .with_label_values(&[])
            .set(info.memory.available as f64);
        gauges[MEMORY_TOTAL_BYTES]
            .with_label_values(&[])
            .set(info.memory.total as f64);
        for path in &info.remote_management.bonding.paths {
            let ni = interface_id(&path.network_interface);
            gauges[BONDING_PATH_RTT_SECONDS]
                .with_label_values(&[ni])
                .set(path.rtt);
            gauges[BONDING_PATH_RX_BITRATE]
                .with_label_values(&[ni])
                .set(path.rx_bitrate as f64);
            gauges[BONDING_PATH_TX_BITRATE]
                .with_label_values(&[ni])
                .set(path.tx_bitrate as f64);
            gauges[BONDING_PATH_HEALTH]
                .with_label_values(&[ni])
                .set(health_value(&path.health));
        }
    }

    // The info gauge is always exposed. It reads 1 only for a complete
    // decode: a payload missing the firmware section reads 0 with empty
    // version labels.
    let complete = result.is_ok() && info.firmware.is_some();
    let firmware = info.firmware.unwrap_or_default();
    gauges[SYSTEM_INFO]
        .with_label_values(&[
            &firmware.running.version,
            &firmware.recovery.version,
            &firmware.default.version,
        ])
        .set(bool_value(complete));

    result
}
