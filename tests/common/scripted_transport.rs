use async_trait::async_trait;
use pdf4me_client::policy::PollPolicy;
use pdf4me_client::{AsyncJobClient, ClientError, ClientResult, Credentials, HttpTransport, RawResponse};
use reqwest::header::HeaderValue;
use reqwest::Url;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MOCK_BASE_URL: &str = "http://mock/";
pub const MOCK_API_KEY: &str = "test-key";
pub const MOCK_POLL_URL: &str = "http://mock/status/123";

/// One request seen by the scripted transport
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Post {
        url: String,
        authorization: String,
        body: Value,
    },
    Get {
        url: String,
        authorization: String,
    },
}

/// Transport that replays queued responses and records every call.
///
/// Calls are recorded when they start, so a GET cancelled mid-flight still
/// counts as issued.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    post_responses: Mutex<VecDeque<ClientResult<RawResponse>>>,
    get_responses: Mutex<VecDeque<ClientResult<RawResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
    get_latency: Duration,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every GET takes `latency` on the tokio clock
    pub fn with_get_latency(mut self, latency: Duration) -> Self {
        self.get_latency = latency;
        self
    }

    pub fn on_post(self, response: RawResponse) -> Self {
        self.post_responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn on_get(self, response: RawResponse) -> Self {
        self.get_responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn on_get_times(self, response: RawResponse, times: usize) -> Self {
        (0..times).fold(self, |t, _| t.on_get(response.clone()))
    }

    pub fn on_get_error(self, message: &str) -> Self {
        self.get_responses
            .lock()
            .unwrap()
            .push_back(Err(ClientError::TransportMessage(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn post_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, RecordedCall::Post { .. }))
            .count()
    }

    pub fn get_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RecordedCall::Get { url, .. } => Some(url),
                RecordedCall::Post { .. } => None,
            })
            .collect()
    }

    fn next(queue: &Mutex<VecDeque<ClientResult<RawResponse>>>) -> ClientResult<RawResponse> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::TransportMessage("script exhausted".into())))
    }
}

fn header_text(value: &HeaderValue) -> String {
    value.to_str().unwrap_or_default().to_string()
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    fn transport_name(&self) -> &'static str {
        "scripted"
    }

    async fn post_json(
        &self,
        url: &Url,
        authorization: &HeaderValue,
        body: &Value,
    ) -> ClientResult<RawResponse> {
        self.calls.lock().unwrap().push(RecordedCall::Post {
            url: url.to_string(),
            authorization: header_text(authorization),
            body: body.clone(),
        });
        Self::next(&self.post_responses)
    }

    async fn get(&self, url: &Url, authorization: &HeaderValue) -> ClientResult<RawResponse> {
        self.calls.lock().unwrap().push(RecordedCall::Get {
            url: url.to_string(),
            authorization: header_text(authorization),
        });
        if !self.get_latency.is_zero() {
            tokio::time::sleep(self.get_latency).await;
        }
        Self::next(&self.get_responses)
    }
}

pub fn ok(body: &str) -> RawResponse {
    RawResponse::new(200, body.as_bytes().to_vec())
}

pub fn processing() -> RawResponse {
    RawResponse::new(202, Vec::new())
}

pub fn accepted(location: &str) -> RawResponse {
    RawResponse::new(202, Vec::new()).with_location(location)
}

/// Client over a scripted transport, keeping a handle for assertions
pub fn scripted_client(
    transport: ScriptedTransport,
    policy: impl PollPolicy + 'static,
) -> (AsyncJobClient, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let client = AsyncJobClient::with_transport(
        transport.clone(),
        MOCK_BASE_URL,
        &Credentials::new(MOCK_API_KEY).unwrap(),
    )
    .unwrap()
    .with_policy(policy);
    (client, transport)
}
