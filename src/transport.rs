use crate::config::ClientConfig;
use crate::error::{KlsError, KlsResult};
use log::{debug, warn};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Status a transport reports when the connection could not be established in time.
pub const CONNECT_TIMEOUT_STATUS: i32 = -1;

/// Status a transport reports when the response did not arrive in time.
pub const RESPONSE_TIMEOUT_STATUS: i32 = -2;

/// Connect and response timeouts for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub response: Duration,
}

impl Timeouts {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            connect: config.connect_timeout,
            response: config.response_timeout,
        }
    }
}

/// A signed request ready to go on the wire
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub timeouts: Timeouts,
}

/// Response exactly as the transport received it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawResponse {
    pub status: i32,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RawResponse {
    /// Parse the body as JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    pub fn is_sentinel(&self) -> bool {
        self.status == CONNECT_TIMEOUT_STATUS || self.status == RESPONSE_TIMEOUT_STATUS
    }
}

/// HTTP transport used by the dispatcher
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Connection-level failures are reported as
    /// [`KlsError::Transport`].
    async fn send(&self, request: TransportRequest) -> KlsResult<RawResponse>;
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport honouring the configured connect timeout.
    pub fn new(config: &ClientConfig) -> KlsResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| KlsError::config_error(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> KlsResult<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .timeout(request.timeouts.response);

        // reqwest derives Host from the URL, which is what was signed.
        for (name, value) in request
            .headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("host"))
        {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            warn!("{} {} failed: {}", request.method, request.url, e);
            KlsError::transport_failure()
        })?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(|e| {
            warn!("Reading response body from {} failed: {}", request.url, e);
            KlsError::transport_failure()
        })?;
        debug!("HTTP {} from {} ({} bytes)", status, request.url, body.len());

        Ok(RawResponse {
            status: i32::from(status.as_u16()),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(status: i32, body: &str) -> RawResponse {
        RawResponse {
            status,
            status_text: String::new(),
            headers: BTreeMap::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn json_body_parses() {
        assert_eq!(raw(200, r#"{"a":1}"#).json(), Some(json!({"a": 1})));
        assert_eq!(raw(200, "<html>").json(), None);
    }

    #[test]
    fn sentinel_statuses() {
        assert!(raw(-1, "").is_sentinel());
        assert!(raw(-2, "").is_sentinel());
        assert!(!raw(500, "").is_sentinel());
    }

    #[test]
    fn timeouts_follow_config() {
        let config = ClientConfig::builder()
            .api_version("v")
            .access_key_id("ak")
            .secret_access_key("sk")
            .connect_timeout(Duration::from_millis(250))
            .build()
            .unwrap();
        let timeouts = Timeouts::from_config(&config);
        assert_eq!(timeouts.connect, Duration::from_millis(250));
        assert_eq!(timeouts.response, Duration::from_secs(60));
    }

    #[test]
    fn connection_refused_maps_to_500() {
        let config = ClientConfig::new("v", "ak", "sk").unwrap();
        let transport = ReqwestTransport::new(&config).unwrap();
        let request = TransportRequest {
            // Port 9 (discard) on localhost is not expected to accept connections.
            url: "http://127.0.0.1:9/".to_string(),
            method: Method::GET,
            headers: BTreeMap::new(),
            body: String::new(),
            timeouts: Timeouts::from_config(&config),
        };
        let err = tokio_test::block_on(transport.send(request)).unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
