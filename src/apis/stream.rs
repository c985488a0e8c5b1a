use crate::{
    apis::call,
    client::KlsClient,
    error::KlsResult,
    models::Params,
    registry::Action,
};
use log::info;
use serde_json::Value;

/// Stream query and control operations
pub struct StreamApi<'a> {
    client: &'a KlsClient,
}

impl<'a> StreamApi<'a> {
    pub fn new(client: &'a KlsClient) -> Self {
        Self { client }
    }

    /// List streams that are live right now
    pub async fn list_realtime_streams_info(&self, params: Option<Params>) -> KlsResult<Value> {
        info!("Listing realtime streams");
        call(self.client, Action::ListRealtimeStreamsInfo, params).await
    }

    /// List streams currently being published
    pub async fn list_realtime_pub_streams_info(
        &self,
        params: Option<Params>,
    ) -> KlsResult<Value> {
        info!("Listing realtime publishing streams");
        call(self.client, Action::ListRealtimePubStreamsInfo, params).await
    }

    /// List past publishing sessions
    pub async fn list_history_pub_streams_info(
        &self,
        params: Option<Params>,
    ) -> KlsResult<Value> {
        info!("Listing historical publishing sessions");
        call(self.client, Action::ListHistoryPubStreamsInfo, params).await
    }

    /// List errors recorded for past publishing sessions
    pub async fn list_history_pub_streams_err_info(
        &self,
        params: Option<Params>,
    ) -> KlsResult<Value> {
        info!("Listing historical publishing errors");
        call(self.client, Action::ListHistoryPubStreamsErrInfo, params).await
    }

    /// Publishing durations per stream
    pub async fn list_stream_durations(&self, params: Option<Params>) -> KlsResult<Value> {
        info!("Listing stream durations");
        call(self.client, Action::ListStreamDurations, params).await
    }

    /// Forbid publishing on a stream
    ///
    /// # Arguments
    /// * `params` - Stream identification (`UniqueName`, `App`, `Pubdomain`,
    ///   `StreamName`) and an optional `ResumeTime`
    pub async fn forbid_stream(&self, params: Params) -> KlsResult<Value> {
        info!("Forbidding stream {:?}", params.get("StreamName"));
        call(self.client, Action::ForbidStream, Some(params)).await
    }

    /// Allow publishing on a previously forbidden stream
    pub async fn resume_stream(&self, params: Params) -> KlsResult<Value> {
        info!("Resuming stream {:?}", params.get("StreamName"));
        call(self.client, Action::ResumeStream, Some(params)).await
    }
}
