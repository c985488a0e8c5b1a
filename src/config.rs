use crate::auth::Credentials;
use crate::error::{KlsError, KlsResult};
use std::env;
use std::time::Duration;

/// Default API host.
pub const DEFAULT_HOST: &str = "kls.api.ksyuncs.com";

/// Host used by earlier releases of the service.
pub const LEGACY_HOST: &str = "kls.api.ksyun.com";

pub const DEFAULT_REGION: &str = "cn-beijing-6";

/// Service name in the credential scope.
pub const SERVICE: &str = "kls";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3_000);
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Immutable configuration for [`crate::KlsClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) api_version: String,
    pub(crate) credentials: Credentials,
    pub(crate) host: String,
    pub(crate) region: String,
    pub(crate) service: String,
    pub(crate) scheme: String,
    pub(crate) connect_timeout: Duration,
    pub(crate) response_timeout: Duration,
}

impl ClientConfig {
    /// Configuration with the three required fields and defaults for the rest.
    pub fn new(
        api_version: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> KlsResult<Self> {
        Self::builder()
            .api_version(api_version)
            .access_key_id(access_key_id)
            .secret_access_key(secret_access_key)
            .build()
    }

    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Reads `KSYUN_ACCESS_KEY_ID`, `KSYUN_SECRET_ACCESS_KEY` and
    /// `KLS_API_VERSION`, plus optional `KLS_HOST` and `KLS_REGION`.
    pub fn from_env() -> KlsResult<Self> {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());
        let mut builder = Self::builder();
        if let Some(v) = var("KLS_API_VERSION") {
            builder = builder.api_version(v);
        }
        if let Some(v) = var("KSYUN_ACCESS_KEY_ID") {
            builder = builder.access_key_id(v);
        }
        if let Some(v) = var("KSYUN_SECRET_ACCESS_KEY") {
            builder = builder.secret_access_key(v);
        }
        if let Some(v) = var("KLS_HOST") {
            builder = builder.host(v);
        }
        if let Some(v) = var("KLS_REGION") {
            builder = builder.region(v);
        }
        builder.build()
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// `scheme://host`
    pub fn endpoint(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

/// Builder for [`ClientConfig`]. Fields left unset fall back to the defaults.
#[derive(Debug, Default, Clone)]
pub struct ClientConfigBuilder {
    api_version: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    host: Option<String>,
    region: Option<String>,
    scheme: Option<String>,
    connect_timeout: Option<Duration>,
    response_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn access_key_id(mut self, access_key_id: impl Into<String>) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self
    }

    pub fn secret_access_key(mut self, secret_access_key: impl Into<String>) -> Self {
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// `https` unless pointed at a plain-HTTP endpoint such as a local mock.
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> KlsResult<ClientConfig> {
        let api_version = required(self.api_version, "apiVersion")?;
        let access_key_id = required(self.access_key_id, "accessKeyId")?;
        let secret_access_key = required(self.secret_access_key, "secretAccessKey")?;

        let scheme = self.scheme.unwrap_or_else(|| "https".to_string());
        if scheme != "https" && scheme != "http" {
            return Err(KlsError::config_error(format!(
                "unsupported scheme \"{}\"",
                scheme
            )));
        }

        Ok(ClientConfig {
            api_version,
            credentials: Credentials::new(access_key_id, secret_access_key),
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            region: self.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            service: SERVICE.to_string(),
            scheme,
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            response_timeout: self.response_timeout.unwrap_or(DEFAULT_RESPONSE_TIMEOUT),
        })
    }
}

fn required(value: Option<String>, name: &str) -> KlsResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(KlsError::config_error(format!("must pass \"config.{}\"", name))),
    }
}
