//! Network interface stage: per-interface bitrates, link speed and
//! internet reachability.

use std::time::Instant;

use prometheus::Registry;
use tracing::trace;

use super::GatherError;
use super::labels;
use crate::client::DeviceClient;
use crate::metrics::{GaugeSpec, bool_label, bool_value, register_gauges};
use crate::models::InterfacesStatus;

const INTERFACE_RX_BITRATE: &str = "interface_rx_bitrate_bytes_per_second";
const INTERFACE_TX_BITRATE: &str = "interface_tx_bitrate_bytes_per_second";
const INTERFACE_LINK_SPEED: &str = "interface_link_speed_bits_per_second";
const INTERFACE_INTERNET_ACCESS: &str = "interface_internet_access";
const INTERFACE_TESTING_INTERNET_ACCESS: &str = "interface_testing_internet_access";

const INTERFACE_LABELS: &[&str] = &[
    labels::INTERFACE_MAC,
    labels::IP_ADDRESS,
    labels::PRIMARY_INTERFACE,
];

const SPECS: &[GaugeSpec] = &[
    GaugeSpec {
        name: INTERFACE_RX_BITRATE,
        help: "Receive bitrate in bits per second for the interface",
        labels: INTERFACE_LABELS,
    },
    GaugeSpec {
        name: INTERFACE_TX_BITRATE,
        help: "Transmit bitrate in bits per second for the interface",
        labels: INTERFACE_LABELS,
    },
    GaugeSpec {
        name: INTERFACE_LINK_SPEED,
        help: "Ethernet link speed in bits per second. -1 if unknown",
        labels: INTERFACE_LABELS,
    },
    GaugeSpec {
        name: INTERFACE_INTERNET_ACCESS,
        help: "Boolean indicating if the interface has internet access (1 = yes, 0 = no)",
        labels: INTERFACE_LABELS,
    },
    GaugeSpec {
        name: INTERFACE_TESTING_INTERNET_ACCESS,
        help: "Boolean indicating if the interface is testing internet access (1 = yes, 0 = no)",
        labels: INTERFACE_LABELS,
    },
];

pub(super) async fn gather(
    client: &DeviceClient,
    registry: &Registry,
    serial: &str,
    deadline: Instant,
) -> Result<(), GatherError> {
    let gauges = register_gauges(registry, SPECS)?;

    let body = client
        .fetch(serial, "network_interfaces/status", deadline)
        .await?;
    let interfaces: InterfacesStatus = serde_json::from_slice(&body)?;

    trace!("Successfully retrieved metrics for network interfaces status");

    for interface in &interfaces.status {
        let mac = interface.ethernet.address.as_str();
        let ip = interface.ip.address.as_str();
        let primary = bool_label(interface.primary_interface);
        gauges[INTERFACE_RX_BITRATE]
            .with_label_values(&[mac, ip, primary])
            .set(interface.rx_bitrate);
        gauges[INTERFACE_TX_BITRATE]
            .with_label_values(&[mac, ip, primary])
            .set(interface.tx_bitrate);
        gauges[INTERFACE_LINK_SPEED]
            .with_label_values(&[mac, ip, primary])
            .set(interface.ethernet.link);
        gauges[INTERFACE_INTERNET_ACCESS]
            .with_label_values(&[mac, ip, primary])
            .set(bool_value(interface.internet_access));
        gauges[INTERFACE_TESTING_INTERNET_ACCESS]
            .with_label_values(&[mac, ip, primary])
            .set(bool_value(interface.testing_internet_access));
    }

    Ok(())
}
