//! Sends signed requests and classifies the responses.

use crate::compose::RequestDescriptor;
use crate::error::{KlsError, KlsResult, APPLICATION_FAILURE_STATUS};
use crate::models::{ErrorEnvelope, ResponseEnvelope};
use crate::transport::{RawResponse, Timeouts, Transport, TransportRequest};
use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// Classified, successful JSON payload.
    Payload(Value),
    /// Untouched transport response.
    Raw(RawResponse),
}

#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    scheme: String,
    timeouts: Timeouts,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, scheme: impl Into<String>, timeouts: Timeouts) -> Self {
        Self {
            transport,
            scheme: scheme.into(),
            timeouts,
        }
    }

    /// Send `descriptor` once. With `raw`, the transport response is returned
    /// without any classification.
    pub async fn dispatch(
        &self,
        descriptor: RequestDescriptor,
        raw: bool,
        response_timeout: Option<Duration>,
    ) -> KlsResult<Dispatched> {
        let response = self.send(descriptor, response_timeout).await?;
        if raw {
            return Ok(Dispatched::Raw(response));
        }
        classify(response).map(Dispatched::Payload)
    }

    /// Send `descriptor` once and hand back the transport response as is.
    pub async fn send(
        &self,
        descriptor: RequestDescriptor,
        response_timeout: Option<Duration>,
    ) -> KlsResult<RawResponse> {
        let timeouts = Timeouts {
            connect: self.timeouts.connect,
            response: response_timeout.unwrap_or(self.timeouts.response),
        };
        let request = TransportRequest {
            url: descriptor.url(&self.scheme),
            method: descriptor.method,
            headers: descriptor.headers,
            body: descriptor.body,
            timeouts,
        };
        info!("HTTP {} {}", request.method, request.url);

        let response = self.transport.send(request).await?;
        debug!("Response status {}", response.status);
        Ok(response)
    }
}

/// Apply the response policy: sentinel status, HTTP status, then `Data.RetCode`.
pub fn classify(response: RawResponse) -> KlsResult<Value> {
    if response.is_sentinel() {
        return Err(KlsError::transport_error(response.status, response.status_text));
    }

    if response.status > 399 {
        let payload = response
            .json()
            .unwrap_or_else(|| Value::String(response.body.clone()));
        let message = ErrorEnvelope::message_of(&payload).unwrap_or(response.status_text);
        return Err(KlsError::Http {
            status: u16::try_from(response.status).unwrap_or(u16::MAX),
            message,
            payload,
        });
    }

    let payload = match response.json() {
        Some(payload) => payload,
        None => {
            debug!("Response body is not JSON: {}", truncate_str(&response.body, 200));
            return Err(KlsError::transport_failure());
        }
    };

    if let Some(data) = ResponseEnvelope::from_payload(&payload).data {
        if !data.is_ok() {
            return Err(KlsError::Application {
                status: APPLICATION_FAILURE_STATUS,
                message: data.ret_msg.unwrap_or_default(),
                payload,
            });
        }
    }
    Ok(payload)
}

fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
