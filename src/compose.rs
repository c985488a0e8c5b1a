//! Turns an action name and user parameters into an unsigned request.

use crate::config::ClientConfig;
use crate::error::{KlsError, KlsResult};
use crate::registry;
use log::{debug, warn};
use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Query keys set by the composer that user parameters may never replace.
const RESERVED_KEYS: [&str; 2] = ["Action", "Version"];

/// An HTTP request before or after signing. `path` includes the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub host: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub region: String,
    pub service: String,
}

impl RequestDescriptor {
    /// Path component without the query string.
    pub fn pathname(&self) -> &str {
        self.path.split_once('?').map_or(self.path.as_str(), |(p, _)| p)
    }

    /// Raw query string, empty when there is none.
    pub fn query(&self) -> &str {
        self.path.split_once('?').map_or("", |(_, q)| q)
    }

    /// Header value, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets a header, replacing any existing entry that differs only in case.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.into());
    }

    pub fn url(&self, scheme: &str) -> String {
        format!("{}://{}{}", scheme, self.host, self.path)
    }
}

/// Per-call overrides
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub path: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Return the untouched transport response instead of the classified payload.
    pub raw: bool,
    /// Response timeout for this call only.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Build the unsigned request for `action`.
///
/// GET requests carry `user_params` in the query string; every other method
/// sends them as a JSON body. `Action` and `Version` are always present in the
/// query and cannot be shadowed.
pub fn compose(
    action: &str,
    user_params: Option<&Value>,
    options: &RequestOptions,
    config: &ClientConfig,
) -> KlsResult<RequestDescriptor> {
    let spec = registry::lookup(action)?;
    let params = match user_params {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            return Err(KlsError::invalid_param(format!(
                "userParams must be a key-value mapping, got {}",
                json_kind(other)
            )))
        }
    };

    let method = options.method.clone().unwrap_or(spec.method);
    let raw_path = options.path.as_deref().unwrap_or(spec.path);
    let (pathname, existing_query) = match raw_path.split_once('?') {
        Some((p, q)) => (p, q),
        None => (raw_path, ""),
    };
    let pathname = if pathname.is_empty() { "/" } else { pathname };

    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url::form_urlencoded::parse(existing_query.as_bytes()) {
        query
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    query.insert("Action".to_string(), vec![action.to_string()]);
    query.insert("Version".to_string(), vec![config.api_version.clone()]);

    let mut body = String::new();
    if let Some(params) = params {
        if method == Method::GET {
            for (key, value) in params {
                if RESERVED_KEYS.contains(&key.as_str()) || query.contains_key(key) {
                    warn!("Ignoring user parameter {} already set on the query", key);
                    continue;
                }
                query.insert(key.clone(), query_values(key, value)?);
            }
        } else {
            body = serde_json::to_string(params)
                .map_err(|e| KlsError::invalid_param(format!("cannot serialize userParams: {}", e)))?;
        }
    }

    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    let mut descriptor = RequestDescriptor {
        method,
        host: config.host.clone(),
        path: format!("{}?{}", pathname, encode_query(&query)),
        headers,
        body,
        region: config.region.clone(),
        service: config.service.clone(),
    };
    for (name, value) in &options.headers {
        descriptor.set_header(name, value.clone());
    }

    debug!(
        "Composed {} {} {} (body {} bytes)",
        action,
        descriptor.method,
        descriptor.path,
        descriptor.body.len()
    );
    Ok(descriptor)
}

/// Encode a query map with keys in sorted order and values in insertion order.
pub fn encode_query(query: &BTreeMap<String, Vec<String>>) -> String {
    query
        .iter()
        .flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn query_values(key: &str, value: &Value) -> KlsResult<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(|item| scalar(key, item)).collect(),
        other => Ok(vec![scalar(key, other)?]),
    }
}

fn scalar(key: &str, value: &Value) -> KlsResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        nested => Err(KlsError::invalid_param(format!(
            "userParams.{} must be a flat value for query parameters, got {}",
            key,
            json_kind(nested)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
