//! # Job Types
//!
//! Request and response shapes for one logical PDF4me operation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

use crate::error::{ClientError, ClientResult};

/// How a `200` body should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// Raw file bytes (converted PDF, image, archive, ...)
    #[default]
    Binary,
    /// UTF-8 text, usually JSON metadata
    Text,
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// One job to submit.
///
/// `payload` already holds any base64 document content; the client only
/// adds the `async` hint when serialising.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    /// Endpoint path (`/api/v2/Merge`) or absolute URL
    pub endpoint: String,
    /// Operation-specific parameters
    pub payload: Map<String, Value>,
    /// Ask the server to process asynchronously
    pub async_hint: bool,
    /// Decoding for the terminal `200` body
    pub result_kind: ResultKind,
}

impl JobRequest {
    pub fn new(endpoint: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            endpoint: endpoint.into(),
            payload,
            async_hint: true,
            result_kind: ResultKind::Binary,
        }
    }

    #[must_use]
    pub fn with_result_kind(mut self, result_kind: ResultKind) -> Self {
        self.result_kind = result_kind;
        self
    }

    #[must_use]
    pub fn with_async_hint(mut self, async_hint: bool) -> Self {
        self.async_hint = async_hint;
        self
    }

    /// JSON body as sent on the wire
    pub fn body(&self) -> Value {
        let mut body = self.payload.clone();
        body.insert("async".to_string(), Value::Bool(self.async_hint));
        Value::Object(body)
    }
}

/// Decoded terminal result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutput {
    Bytes(Vec<u8>),
    Text(String),
}

impl JobOutput {
    /// Decode a response body according to the declared result kind
    pub fn decode(kind: ResultKind, body: Vec<u8>) -> ClientResult<Self> {
        match kind {
            ResultKind::Binary => Ok(Self::Bytes(body)),
            ResultKind::Text => String::from_utf8(body)
                .map(Self::Text)
                .map_err(|e| ClientError::Decode(format!("response is not valid UTF-8: {e}"))),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Text(text) => text.as_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Parse the result as JSON (metadata-style operations)
    pub fn json(&self) -> ClientResult<Value> {
        Ok(serde_json::from_slice(self.as_bytes())?)
    }

    /// Write the result to `path`, creating parent directories
    ///
    /// ```rust
    /// use pdf4me_client::JobOutput;
    ///
    /// # tokio_test::block_on(async {
    /// let dir = tempfile::tempdir().unwrap();
    /// let path = dir.path().join("nested").join("result.pdf");
    ///
    /// JobOutput::Bytes(b"%PDF-1.7".to_vec()).write_to(&path).await.unwrap();
    /// assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
    /// # });
    /// ```
    pub async fn write_to(&self, path: &Path) -> ClientResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.as_bytes()).await?;
        Ok(())
    }
}

/// Classified outcome of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResponse {
    /// `200`: the result is in the body
    Completed(JobOutput),
    /// `202`: poll this URL for the result
    Accepted { poll_url: String },
    /// Any other status
    Failed { status: u16, body: String },
}

impl JobResponse {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}
