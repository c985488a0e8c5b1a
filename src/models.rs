use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat key-value parameters sent with an action.
pub type Params = Map<String, Value>;

/// Business status embedded in every KLS response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetStatus {
    pub ret_code: Option<Value>,
    pub ret_msg: Option<String>,
}

impl RetStatus {
    /// `true` only for a numeric `RetCode` equal to zero.
    pub fn is_ok(&self) -> bool {
        self.ret_code.as_ref().and_then(Value::as_f64) == Some(0.0)
    }
}

/// Envelope of a successful HTTP response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseEnvelope {
    pub request_id: Option<String>,
    pub data: Option<RetStatus>,
}

impl ResponseEnvelope {
    /// Reads the envelope out of an arbitrary payload. A `Data` key of any
    /// type yields a status; `RetCode` is kept as sent.
    pub fn from_payload(payload: &Value) -> Self {
        let data = payload.get("Data").map(|data| RetStatus {
            ret_code: data.get("RetCode").cloned(),
            ret_msg: data
                .get("RetMsg")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
        Self {
            request_id: payload
                .get("RequestId")
                .and_then(Value::as_str)
                .map(str::to_string),
            data,
        }
    }
}

/// Error detail returned with HTTP error statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorDetail {
    pub code: Option<Value>,
    pub message: Option<String>,
}

/// Error response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorEnvelope {
    pub request_id: Option<Value>,
    pub error: Option<ErrorDetail>,
}

impl ErrorEnvelope {
    /// `Error.Message` of the payload, if any.
    pub fn message_of(payload: &Value) -> Option<String> {
        payload
            .pointer("/Error/Message")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}
