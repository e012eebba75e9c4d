//! HTTP client for the Direkt unit REST API.

use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::config::{Credentials, DeviceConfig};

/// Errors returned by [`DeviceClient::fetch`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The unit answered 503: transiently unavailable or rebooting. This is
    /// the sentinel that aborts the remaining probe pipeline.
    #[error("unit offline")]
    Offline,

    /// Any other non-200 response from the device API.
    #[error("unexpected status code {0}")]
    Status(StatusCode),

    /// DNS, connect, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The probe deadline expired before the call could be made.
    #[error("probe deadline exceeded")]
    DeadlineExceeded,
}

/// Client for the unit REST API. Holds only static configuration and is
/// safe to share across concurrent probe requests.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    call_timeout: Duration,
}

impl DeviceClient {
    pub fn new(config: &DeviceConfig, credentials: Credentials) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            call_timeout: Duration::from_secs(config.call_timeout_secs),
        })
    }

    /// GET a sub-resource of a unit, e.g. `fetch("D01234", "system/status", ..)`.
    ///
    /// The call is bounded by the per-call timeout or the time left until
    /// `deadline`, whichever is shorter; an already expired deadline fails
    /// without any network I/O. Returns the raw response body; decoding is
    /// the caller's concern.
    pub async fn fetch(
        &self,
        serial: &str,
        path: &str,
        deadline: Instant,
    ) -> Result<Bytes, ClientError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ClientError::DeadlineExceeded);
        }

        let url = format!("{}/api/v1/units/{}/{}", self.base_url, serial, path);
        let mut request = self
            .http
            .get(&url)
            .timeout(remaining.min(self.call_timeout));
        if self.credentials.is_configured() {
            debug!("Authentication set");
            request = request.basic_auth(&self.credentials.username, Some(&self.credentials.password));
        }

        trace!(url = %url, "Sending request");
        let response = request.send().await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::SERVICE_UNAVAILABLE => return Err(ClientError::Offline),
            status => {
                info!(status_code = status.as_u16(), url = %url, "Non-OK status code returned");
                return Err(ClientError::Status(status));
            }
        }

        let body = response.bytes().await?;
        trace!(url = %url, "Finished request, returning body");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::HeaderMap;
    use axum::routing::get;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str, credentials: Credentials) -> DeviceClient {
        let config = DeviceConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        DeviceClient::new(&config, credentials).unwrap()
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(5)
    }

    #[tokio::test]
    async fn fetch_returns_body_on_ok() {
        let router = Router::new().route(
            "/api/v1/units/D01234/system/status",
            get(|| async { r#"{"cpu":{"usage":1.0}}"# }),
        );
        let base_url = serve(router).await;
        let client = client_for(&base_url, Credentials::default());

        let body = client
            .fetch("D01234", "system/status", deadline())
            .await
            .unwrap();

        assert_eq!(&body[..], br#"{"cpu":{"usage":1.0}}"#);
    }

    #[tokio::test]
    async fn fetch_maps_503_to_offline() {
        let router = Router::new().route(
            "/api/v1/units/D01234/system/status",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base_url = serve(router).await;
        let client = client_for(&base_url, Credentials::default());

        let err = client
            .fetch("D01234", "system/status", deadline())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Offline));
    }

    #[tokio::test]
    async fn fetch_maps_other_status_to_status_error() {
        let router = Router::new().route(
            "/api/v1/units/D01234/encoders",
            get(|| async { StatusCode::NOT_FOUND }),
        );
        let base_url = serve(router).await;
        let client = client_for(&base_url, Credentials::default());

        let err = client.fetch("D01234", "encoders", deadline()).await.unwrap_err();

        assert!(matches!(err, ClientError::Status(StatusCode::NOT_FOUND)));
    }

    #[tokio::test]
    async fn expired_deadline_fails_without_io() {
        // Unroutable base URL: reaching the network would fail differently.
        let client = client_for("http://127.0.0.1:1", Credentials::default());

        let err = client
            .fetch("D01234", "system/status", Instant::now())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn basic_auth_applied_when_configured() {
        let router = Router::new().route(
            "/api/v1/units/D01234/system/status",
            get(|headers: HeaderMap| async move {
                if headers.contains_key("authorization") {
                    (StatusCode::OK, "{}")
                } else {
                    (StatusCode::UNAUTHORIZED, "")
                }
            }),
        );
        let base_url = serve(router).await;
        let credentials = Credentials {
            username: "user".to_string(),
            password: "secret".to_string(),
        };
        let client = client_for(&base_url, credentials);

        let result = client.fetch("D01234", "system/status", deadline()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn anonymous_when_credentials_missing() {
        let router = Router::new().route(
            "/api/v1/units/D01234/system/status",
            get(|headers: HeaderMap| async move {
                if headers.contains_key("authorization") {
                    (StatusCode::UNAUTHORIZED, "")
                } else {
                    (StatusCode::OK, "{}")
                }
            }),
        );
        let base_url = serve(router).await;
        let client = client_for(&base_url, Credentials::default());

        let result = client.fetch("D01234", "system/status", deadline()).await;

        assert!(result.is_ok());
    }
}
