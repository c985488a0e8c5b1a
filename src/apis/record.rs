use crate::{
    apis::call,
    client::KlsClient,
    error::KlsResult,
    models::Params,
    registry::Action,
};
use log::info;
use serde_json::Value;

/// Recording task operations
pub struct RecordApi<'a> {
    client: &'a KlsClient,
}

impl<'a> RecordApi<'a> {
    pub fn new(client: &'a KlsClient) -> Self {
        Self { client }
    }

    /// List recording tasks that are running
    pub async fn list_recording_tasks(&self, params: Option<Params>) -> KlsResult<Value> {
        info!("Listing recording tasks");
        call(self.client, Action::ListRecordingTasks, params).await
    }

    /// List finished recording tasks
    pub async fn list_history_record_tasks(&self, params: Option<Params>) -> KlsResult<Value> {
        info!("Listing historical recording tasks");
        call(self.client, Action::ListHistoryRecordTasks, params).await
    }

    /// Get one recording task
    pub async fn get_record_task(&self, params: Params) -> KlsResult<Value> {
        info!("Getting recording task {:?}", params.get("TaskID"));
        call(self.client, Action::GetRecordTask, Some(params)).await
    }

    /// Create a scheduled recording task
    pub async fn create_record_task(&self, params: Params) -> KlsResult<Value> {
        info!("Creating recording task");
        call(self.client, Action::CreateRecordTask, Some(params)).await
    }

    /// Cancel a scheduled recording task
    pub async fn cancel_record_task(&self, params: Params) -> KlsResult<Value> {
        info!("Cancelling recording task {:?}", params.get("TaskID"));
        call(self.client, Action::CancelRecordTask, Some(params)).await
    }

    /// Start recording a live stream immediately
    pub async fn start_stream_record(&self, params: Params) -> KlsResult<Value> {
        info!("Starting stream recording for {:?}", params.get("StreamName"));
        call(self.client, Action::StartStreamRecord, Some(params)).await
    }

    /// Stop an ongoing stream recording
    pub async fn stop_stream_record(&self, params: Params) -> KlsResult<Value> {
        info!("Stopping stream recording for {:?}", params.get("StreamName"));
        call(self.client, Action::StopStreamRecord, Some(params)).await
    }
}
