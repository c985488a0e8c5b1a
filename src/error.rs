use serde_json::Value;
use thiserror::Error;

/// Status reported for transport failures that carry no HTTP status of their own.
pub const TRANSPORT_FAILURE_STATUS: i32 = 500;

/// Status reported for business failures signalled through `Data.RetCode`.
pub const APPLICATION_FAILURE_STATUS: u16 = 400;

/// KLS client error types
#[derive(Error, Debug)]
pub enum KlsError {
    /// A required client setting is missing. Raised at construction time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The operation name is not part of the registered API surface.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// User parameters are not a flat key-value mapping.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Connect/response failure, or a sentinel status reported by the transport.
    #[error("Transport error: {status} - {message}")]
    Transport { status: i32, message: String },

    /// The server answered with a status above 399.
    #[error("HTTP error: {status} - {message}")]
    Http {
        status: u16,
        message: String,
        payload: Value,
    },

    /// HTTP succeeded but the embedded `Data.RetCode` is missing or not zero.
    #[error("Application error: {status} - {message}")]
    Application {
        status: u16,
        message: String,
        payload: Value,
    },
}

/// Result type for KLS operations
pub type KlsResult<T> = Result<T, KlsError>;

impl KlsError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_param(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Create a transport error from a status and message
    pub fn transport_error(status: i32, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    /// Generic transport failure with no detail beyond the 500 sentinel.
    pub fn transport_failure() -> Self {
        Self::transport_error(TRANSPORT_FAILURE_STATUS, "Internal Server Error")
    }

    /// HTTP-status-like code for errors raised after a request was attempted.
    pub fn status(&self) -> Option<i32> {
        match self {
            KlsError::Transport { status, .. } => Some(*status),
            KlsError::Http { status, .. } | KlsError::Application { status, .. } => {
                Some(i32::from(*status))
            }
            KlsError::Configuration(_)
            | KlsError::InvalidAction(_)
            | KlsError::InvalidParameter(_) => None,
        }
    }

    /// Full response payload kept for diagnostics.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            KlsError::Http { payload, .. } | KlsError::Application { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Human-readable message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            KlsError::Configuration(msg)
            | KlsError::InvalidAction(msg)
            | KlsError::InvalidParameter(msg) => msg,
            KlsError::Transport { message, .. }
            | KlsError::Http { message, .. }
            | KlsError::Application { message, .. } => message,
        }
    }
}
