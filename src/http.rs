//! HTTP surface: probe, self-metrics and health endpoints.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, TextEncoder};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::client::DeviceClient;
use crate::gather;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// State shared across handlers. The client holds only static
/// configuration; everything request-scoped is built inside the handler.
#[derive(Clone)]
struct AppState {
    client: DeviceClient,
    probe_timeout: Duration,
}

/// Errors rejecting a probe request before any network call is made.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no serial provided")]
    MissingSerial,
    #[error("invalid serial provided")]
    InvalidSerial,
}

/// A unit serial must be present and start with `D0`.
fn validate_serial(params: &HashMap<String, String>) -> Result<&str, ValidationError> {
    let serial = params.get("serial").map(String::as_str).unwrap_or_default();
    if serial.is_empty() {
        return Err(ValidationError::MissingSerial);
    }
    if !serial.starts_with("D0") {
        return Err(ValidationError::InvalidSerial);
    }
    Ok(serial)
}

/// Create the HTTP router. Unknown paths fall through to axum's 404.
pub fn create_router(client: DeviceClient, probe_timeout: Duration) -> Router {
    let state = AppState {
        client,
        probe_timeout,
    };

    Router::new()
        .route("/probe", get(probe_handler))
        .route("/metrics", get(metrics_handler))
        .route("/-/healthy", get(healthy_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler for the /probe endpoint.
///
/// Validation failures are client errors (400). Gathering failures still
/// return 200 with whatever could be collected; the `request_success`
/// gauge in the body is the authoritative health signal.
async fn probe_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let serial = match validate_serial(&params) {
        Ok(serial) => serial,
        Err(err) => {
            warn!(error = %err, "Error validating request parameters");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    let deadline = Instant::now() + state.probe_timeout;
    let outcome = match gather::gather_metrics(&state.client, serial, deadline).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(serial, error = %err, "Failed to build probe registry");
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };

    if let Some(err) = &outcome.error {
        warn!(serial, error = %err, "Probe completed with errors");
    }

    encode_families(&outcome.registry.gather())
}

/// Handler for the /metrics endpoint: the exporter's own self-metrics
/// from the default registry.
async fn metrics_handler() -> Response {
    encode_families(&prometheus::gather())
}

/// Handler for the /-/healthy endpoint.
async fn healthy_handler() -> Response {
    (StatusCode::OK, "Healthy").into_response()
}

fn encode_families(families: &[MetricFamily]) -> Response {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(err) = encoder.encode(families, &mut buffer) {
        error!(error = %err, "Failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }

    (StatusCode::OK, [("content-type", CONTENT_TYPE)], buffer).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credentials, DeviceConfig};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn make_router() -> Router {
        // Unroutable device endpoint: these tests never reach the network.
        let config = DeviceConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let client = DeviceClient::new(&config, Credentials::default()).unwrap();
        create_router(client, Duration::from_secs(1))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn validate_serial_accepts_d0_prefix() {
        let params = HashMap::from([("serial".to_string(), "D01234".to_string())]);
        assert_eq!(validate_serial(&params).unwrap(), "D01234");
    }

    #[test]
    fn validate_serial_rejects_missing() {
        let err = validate_serial(&HashMap::new()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingSerial));
    }

    #[test]
    fn validate_serial_rejects_wrong_prefix() {
        let params = HashMap::from([("serial".to_string(), "X01234".to_string())]);
        let err = validate_serial(&params).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSerial));
    }

    #[tokio::test]
    async fn test_healthy_endpoint() {
        let response = make_router()
            .oneshot(Request::get("/-/healthy").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Healthy");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let response = make_router()
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));
    }

    #[tokio::test]
    async fn test_probe_without_serial_is_bad_request() {
        let response = make_router()
            .oneshot(Request::get("/probe").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "no serial provided");
    }

    #[tokio::test]
    async fn test_probe_with_invalid_serial_is_bad_request() {
        let response = make_router()
            .oneshot(
                Request::get("/probe?serial=X99999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "invalid serial provided");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = make_router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
