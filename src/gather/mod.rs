//! The per-request gathering pipeline.
//!
//! A probe runs the five stages below in a fixed order against one
//! request-scoped registry. A stage that finds the unit offline aborts the
//! rest of the pipeline; any other stage failure is retained and the
//! remaining stages still run, so the response carries as much of the unit
//! as could be observed.

mod encoders;
mod inputs;
mod interfaces;
mod labels;
mod outputs;
mod system;

use std::collections::HashMap;
use std::time::Instant;

use prometheus::{Gauge, Registry};
use thiserror::Error;
use tracing::{error, info};

use crate::client::{ClientError, DeviceClient};

/// Errors produced by a gatherer stage.
#[derive(Debug, Error)]
pub enum GatherError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Duplicate or otherwise invalid metric registration. Always a
    /// programming error in the stage tables.
    #[error("registering metrics: {0}")]
    Register(#[from] prometheus::Error),
}

impl GatherError {
    /// Whether the unit reported itself offline, which aborts the
    /// remaining pipeline stages.
    pub fn is_offline(&self) -> bool {
        matches!(self, GatherError::Client(ClientError::Offline))
    }
}

/// One gatherer stage. The declaration order is the pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    System,
    Interfaces,
    NetworkInputs,
    VideoOutputs,
    Encoders,
}

const STAGES: [Stage; 5] = [
    Stage::System,
    Stage::Interfaces,
    Stage::NetworkInputs,
    Stage::VideoOutputs,
    Stage::Encoders,
];

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Stage::System => "system",
            Stage::Interfaces => "interfaces",
            Stage::NetworkInputs => "network_inputs",
            Stage::VideoOutputs => "video_outputs",
            Stage::Encoders => "encoders",
        }
    }

    async fn run(
        self,
        client: &DeviceClient,
        registry: &Registry,
        serial: &str,
        deadline: Instant,
    ) -> Result<(), GatherError> {
        match self {
            Stage::System => system::gather(client, registry, serial, deadline).await,
            Stage::Interfaces => interfaces::gather(client, registry, serial, deadline).await,
            Stage::NetworkInputs => inputs::gather(client, registry, serial, deadline).await,
            Stage::VideoOutputs => outputs::gather(client, registry, serial, deadline).await,
            Stage::Encoders => encoders::gather(client, registry, serial, deadline).await,
        }
    }
}

/// Result of one probe: the populated request-scoped registry and the
/// first error retained by the pipeline. The registry is meaningful even
/// when an error is present; partial output is the intended behavior.
pub struct ProbeOutcome {
    pub registry: Registry,
    pub error: Option<GatherError>,
}

/// Run the full pipeline for one unit.
///
/// The registry carries the unit serial as a constant label on every
/// metric, plus two scalar gauges: `request_success` (1 only if no stage
/// errored) and `request_duration_seconds` (always set).
pub async fn gather_metrics(
    client: &DeviceClient,
    serial: &str,
    deadline: Instant,
) -> Result<ProbeOutcome, prometheus::Error> {
    info!(serial, "Requesting metrics for Direkt unit");
    let start = Instant::now();

    let const_labels = HashMap::from([("serial".to_string(), serial.to_string())]);
    let registry = Registry::new_custom(None, Some(const_labels))?;

    let success = Gauge::new(
        "request_success",
        "Displays whether or not the request was a success",
    )?;
    let duration = Gauge::new(
        "request_duration_seconds",
        "Returns how long the request took to complete in seconds",
    )?;
    registry.register(Box::new(success.clone()))?;
    registry.register(Box::new(duration.clone()))?;

    let mut retained: Option<GatherError> = None;
    for stage in STAGES {
        if let Err(err) = stage.run(client, &registry, serial, deadline).await {
            error!(serial, stage = stage.name(), error = %err, "Error retrieving metrics");
            let offline = err.is_offline();
            retained.get_or_insert(err);
            if offline {
                break;
            }
        }
    }

    success.set(if retained.is_none() { 1.0 } else { 0.0 });
    let elapsed = start.elapsed().as_secs_f64();
    duration.set(elapsed);
    info!(serial, duration = elapsed, "Finished gathering metrics");

    Ok(ProbeOutcome {
        registry,
        error: retained,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_is_the_only_aborting_error() {
        let offline = GatherError::Client(ClientError::Offline);
        let upstream = GatherError::Client(ClientError::Status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        ));
        let decode: GatherError = serde_json::from_str::<crate::models::SystemStatus>("not json")
            .unwrap_err()
            .into();

        assert!(offline.is_offline());
        assert!(!upstream.is_offline());
        assert!(!decode.is_offline());
    }
}
