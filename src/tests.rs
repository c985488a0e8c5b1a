//! Client-level tests against an in-memory transport.

use crate::prelude::*;
use crate::transport::{RawResponse, Transport, TransportRequest};
use chrono::TimeZone;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Transport that records every request and answers with a canned response.
#[derive(Clone)]
struct RecordingTransport {
    response: Arc<dyn Fn() -> KlsResult<RawResponse> + Send + Sync>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl RecordingTransport {
    fn replying(status: i32, body: Value) -> Self {
        Self::with(move || {
            Ok(RawResponse {
                status,
                status_text: "OK".to_string(),
                headers: BTreeMap::new(),
                body: body.to_string(),
            })
        })
    }

    fn with(response: impl Fn() -> KlsResult<RawResponse> + Send + Sync + 'static) -> Self {
        Self {
            response: Arc::new(response),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last(&self) -> TransportRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request sent")
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: TransportRequest) -> KlsResult<RawResponse> {
        self.requests.lock().unwrap().push(request);
        (self.response)()
    }
}

fn config() -> ClientConfig {
    ClientConfig::new("2017-01-01", "AKLTtest", "secret").unwrap()
}

fn client(transport: &RecordingTransport) -> KlsClient {
    let instant = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    KlsClient::with_transport(config(), transport.clone()).with_clock(crate::FixedClock(instant))
}

#[tokio::test]
async fn unregistered_action_never_reaches_transport() {
    let transport = RecordingTransport::replying(200, json!({}));
    let result = client(&transport)
        .request("DropAllStreams", None, RequestOptions::default())
        .await;
    assert!(matches!(result, Err(KlsError::InvalidAction(_))));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn invalid_params_never_reach_transport() {
    let transport = RecordingTransport::replying(200, json!({}));
    let result = client(&transport)
        .request("GetBlacklist", Some(json!(["a", "b"])), RequestOptions::default())
        .await;
    assert!(matches!(result, Err(KlsError::InvalidParameter(_))));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn get_request_is_signed_and_sent_once() {
    let transport = RecordingTransport::replying(200, json!({"Data": {"RetCode": 0}}));
    client(&transport)
        .request("GetBlacklist", Some(json!({"foo": "bar"})), RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(transport.calls(), 1);
    let sent = transport.last();
    assert_eq!(sent.method, reqwest::Method::GET);
    assert_eq!(
        sent.url,
        "https://kls.api.ksyuncs.com/?Action=GetBlacklist&Version=2017-01-01&foo=bar"
    );
    assert!(sent.body.is_empty());
    assert_eq!(sent.headers.get("X-Amz-Date").map(String::as_str), Some("20240102T030405Z"));
    assert!(sent.headers["Authorization"].starts_with(
        "AWS4-HMAC-SHA256 Credential=AKLTtest/20240102/cn-beijing-6/kls/aws4_request"
    ));
    assert_eq!(sent.timeouts.connect.as_millis(), 3000);
    assert_eq!(sent.timeouts.response.as_millis(), 60000);
}

#[tokio::test]
async fn post_request_carries_json_body() {
    let transport = RecordingTransport::replying(200, json!({"Data": {"RetCode": 0}}));
    client(&transport)
        .request("ForbidStream", Some(json!({"foo": "bar"})), RequestOptions::default())
        .await
        .unwrap();

    let sent = transport.last();
    assert_eq!(sent.method, reqwest::Method::POST);
    assert_eq!(sent.body, r#"{"foo":"bar"}"#);
    assert_eq!(
        sent.url,
        "https://kls.api.ksyuncs.com/?Action=ForbidStream&Version=2017-01-01"
    );
}

#[tokio::test]
async fn prepare_matches_what_is_sent() {
    let transport = RecordingTransport::replying(200, json!({}));
    let client = client(&transport);
    let params = json!({"App": "live"});
    let prepared = client
        .prepare("GetBlacklist", Some(&params), &RequestOptions::default())
        .unwrap();
    client
        .request("GetBlacklist", Some(params), RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(prepared.headers, transport.last().headers);
}

#[tokio::test]
async fn per_call_timeout_overrides_response_timeout() {
    let transport = RecordingTransport::replying(200, json!({}));
    let options = RequestOptions::new().with_timeout(std::time::Duration::from_secs(2));
    client(&transport)
        .request("GetBlacklist", None, options)
        .await
        .unwrap();
    assert_eq!(transport.last().timeouts.response.as_secs(), 2);
    assert_eq!(transport.last().timeouts.connect.as_millis(), 3000);
}

#[tokio::test]
async fn application_error_surfaces_ret_msg() {
    let body = json!({"Data": {"RetCode": 1, "RetMsg": "quota exceeded"}});
    let transport = RecordingTransport::replying(200, body.clone());
    let err = client(&transport)
        .request("GetBlacklist", None, RequestOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, KlsError::Application { .. }));
    assert_eq!(err.message(), "quota exceeded");
    assert_eq!(err.payload(), Some(&body));
}

#[tokio::test]
async fn transport_failure_propagates() {
    let transport = RecordingTransport::with(|| Err(KlsError::transport_failure()));
    let err = client(&transport)
        .request("GetBlacklist", None, RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn sentinel_status_is_transport_error() {
    let transport = RecordingTransport::with(|| {
        Ok(RawResponse {
            status: -1,
            status_text: "connect timeout".to_string(),
            headers: BTreeMap::new(),
            body: String::new(),
        })
    });
    let err = client(&transport)
        .request("GetBlacklist", None, RequestOptions::default())
        .await
        .unwrap_err();
    match err {
        KlsError::Transport { status, message } => {
            assert_eq!(status, -1);
            assert_eq!(message, "connect timeout");
        }
        other => panic!("expected Transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn raw_option_skips_classification() {
    let body = json!({"Data": {"RetCode": 7, "RetMsg": "nope"}});
    let transport = RecordingTransport::replying(200, body.clone());
    let client = client(&transport);

    let raw = client
        .request("GetBlacklist", None, RequestOptions::new().with_raw(true))
        .await
        .unwrap();
    assert_eq!(raw["status"], json!(200));
    assert_eq!(raw["body"], json!(body.to_string()));

    let typed = client
        .request_raw("GetBlacklist", None, RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(typed.json(), Some(body));
}

#[tokio::test]
async fn concurrent_requests_share_one_client() {
    let transport = RecordingTransport::replying(200, json!({"Data": {"RetCode": 0}}));
    let client = Arc::new(client(&transport));

    let mut handles = Vec::new();
    for i in 0..8 {
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            client
                .request("GetRecordTask", Some(json!({"TaskID": i})), RequestOptions::default())
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(transport.calls(), 8);
}

#[tokio::test]
async fn api_groups_use_registered_routes() {
    let transport = RecordingTransport::replying(200, json!({"Data": {"RetCode": 0}}));
    let client = client(&transport);

    client.streams().resume_stream(Params::new()).await.unwrap();
    assert!(transport.last().url.contains("/api/ResumeStream/2017-01-01?Action=ResumeStream"));

    client.blacklist().get_blacklist(None).await.unwrap();
    assert_eq!(transport.last().method, reqwest::Method::GET);

    let mut params = Params::new();
    params.insert("TaskID".into(), json!("t-1"));
    client.records().cancel_record_task(params).await.unwrap();
    let sent = transport.last();
    assert_eq!(sent.method, reqwest::Method::POST);
    assert_eq!(sent.body, r#"{"TaskID":"t-1"}"#);
}
