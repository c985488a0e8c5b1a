pub mod blacklist;
pub mod record;
pub mod stream;

// Re-export all APIs
pub use blacklist::BlacklistApi;
pub use record::RecordApi;
pub use stream::StreamApi;

use crate::{
    client::KlsClient, compose::RequestOptions, error::KlsResult, models::Params,
    registry::Action,
};
use serde_json::Value;

/// Shared call path for the typed API groups.
pub(crate) async fn call(
    client: &KlsClient,
    action: Action,
    params: Option<Params>,
) -> KlsResult<Value> {
    client
        .request(action.as_str(), params.map(Value::Object), RequestOptions::default())
        .await
}
