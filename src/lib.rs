/*
 * KLS Client - signed HTTP client for the KingSoft Cloud live streaming (KLS) API
 */

// Internal modules
mod client;
pub mod models;
mod apis;
mod error;
mod auth;
mod config;
pub mod registry;
pub mod compose;
pub mod sign;
pub mod transport;
pub mod dispatch;

#[cfg(test)]
mod tests;

// Re-export public types and interfaces
pub use client::KlsClient;
pub use models::*;
pub use apis::*;
pub use error::{KlsError, KlsResult};
pub use auth::{Clock, Credentials, FixedClock, SystemClock};
pub use config::{
    ClientConfig, ClientConfigBuilder, DEFAULT_HOST, DEFAULT_REGION, LEGACY_HOST,
};
pub use registry::{Action, ActionSpec};
pub use compose::{RequestDescriptor, RequestOptions};
pub use transport::{RawResponse, ReqwestTransport, Timeouts, Transport, TransportRequest};

// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        KlsClient,
        ClientConfig,
        Credentials,
        KlsError, KlsResult,
        Action, RequestOptions, Params,
    };
}

// Shared across concurrent callers.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<KlsClient>;
    let _ = assert_send_sync::<KlsError>;
    let _ = assert_send_sync::<ClientConfig>;
};
