use crate::{
    apis::call,
    client::KlsClient,
    error::KlsResult,
    models::Params,
    registry::Action,
};
use log::info;
use serde_json::Value;

/// Blacklist operations
pub struct BlacklistApi<'a> {
    client: &'a KlsClient,
}

impl<'a> BlacklistApi<'a> {
    pub fn new(client: &'a KlsClient) -> Self {
        Self { client }
    }

    /// Get the forbidden streams
    pub async fn get_blacklist(&self, params: Option<Params>) -> KlsResult<Value> {
        info!("Getting blacklist");
        call(self.client, Action::GetBlacklist, params).await
    }

    /// Check whether a stream is on the blacklist
    pub async fn check_blacklist(&self, params: Params) -> KlsResult<Value> {
        info!("Checking blacklist for {:?}", params.get("StreamName"));
        call(self.client, Action::CheckBlacklist, Some(params)).await
    }
}
