//! Payload builder: turns documents and parameters into a [`JobRequest`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value};

use crate::job::{JobRequest, ResultKind};
use crate::operations::{endpoint_for, Operation};

/// Builds the JSON body for one operation.
///
/// # Examples
///
/// ```rust
/// use pdf4me_client::{Operation, PayloadBuilder};
///
/// let request = PayloadBuilder::for_operation(Operation::Merge)
///     .documents([b"%PDF-1 first".as_slice(), b"%PDF-1 second".as_slice()])
///     .doc_name("merged.pdf")
///     .build();
///
/// assert_eq!(request.endpoint, "/api/v2/Merge");
/// assert!(request.body()["docContent"].is_array());
/// ```
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    endpoint: String,
    result_kind: ResultKind,
    async_hint: bool,
    documents: Vec<String>,
    params: Map<String, Value>,
}

impl PayloadBuilder {
    pub fn for_operation(operation: Operation) -> Self {
        Self::new(operation.endpoint(), operation.result_kind())
    }

    /// Uncataloged endpoint by name or path
    pub fn for_endpoint(name: &str, result_kind: ResultKind) -> Self {
        Self::new(endpoint_for(name), result_kind)
    }

    fn new(endpoint: String, result_kind: ResultKind) -> Self {
        Self {
            endpoint,
            result_kind,
            async_hint: true,
            documents: Vec::new(),
            params: Map::new(),
        }
    }

    /// Add one document, base64-encoded into `docContent`
    #[must_use]
    pub fn document(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.documents.push(STANDARD.encode(bytes));
        self
    }

    /// Add several documents; more than one makes `docContent` an array
    #[must_use]
    pub fn documents<I, B>(mut self, documents: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        self.documents
            .extend(documents.into_iter().map(|d| STANDARD.encode(d)));
        self
    }

    #[must_use]
    pub fn doc_name(self, name: impl Into<String>) -> Self {
        self.param("docName", name.into())
    }

    /// Operation-specific parameter; later values replace earlier ones
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn async_hint(mut self, async_hint: bool) -> Self {
        self.async_hint = async_hint;
        self
    }

    #[must_use]
    pub fn result_kind(mut self, result_kind: ResultKind) -> Self {
        self.result_kind = result_kind;
        self
    }

    pub fn build(self) -> JobRequest {
        let mut payload = self.params;
        match self.documents.len() {
            0 => {}
            1 => {
                let doc = self.documents.into_iter().next().unwrap_or_default();
                payload.insert("docContent".to_string(), Value::String(doc));
            }
            _ => {
                let docs = self.documents.into_iter().map(Value::String).collect();
                payload.insert("docContent".to_string(), Value::Array(docs));
            }
        }

        JobRequest::new(self.endpoint, payload)
            .with_async_hint(self.async_hint)
            .with_result_kind(self.result_kind)
    }
}

/// Parse a CLI-style `key=value` parameter.
///
/// Values that parse as JSON (numbers, booleans, objects) keep their type;
/// anything else is sent as a string.
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Empty parameter name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_document_is_string() {
        let request = PayloadBuilder::for_operation(Operation::ConvertToPdf)
            .document(b"hello")
            .doc_name("x.docx")
            .build();

        let body = request.body();
        assert_eq!(body["docContent"], json!("aGVsbG8="));
        assert_eq!(body["docName"], json!("x.docx"));
        assert_eq!(body["async"], json!(true));
        assert_eq!(request.result_kind, ResultKind::Binary);
    }

    #[test]
    fn test_multiple_documents_are_array() {
        let request = PayloadBuilder::for_operation(Operation::Merge)
            .documents([b"a".as_slice(), b"b".as_slice()])
            .build();
        assert_eq!(request.body()["docContent"], json!(["YQ==", "Yg=="]));
    }

    #[test]
    fn test_params_and_sync_hint() {
        let request = PayloadBuilder::for_endpoint("GetPdfMetadata", ResultKind::Text)
            .param("opacity", 100)
            .param("hideText", false)
            .async_hint(false)
            .build();

        assert_eq!(request.endpoint, "/api/v2/GetPdfMetadata");
        assert_eq!(
            request.body(),
            json!({"opacity": 100, "hideText": false, "async": false})
        );
    }

    #[test]
    fn test_parse_param_types() {
        assert_eq!(parse_param("opacity=100").unwrap(), ("opacity".into(), json!(100)));
        assert_eq!(parse_param("hideText=true").unwrap(), ("hideText".into(), json!(true)));
        assert_eq!(parse_param("pages=1-3").unwrap(), ("pages".into(), json!("1-3")));
        assert_eq!(parse_param("text=a=b").unwrap(), ("text".into(), json!("a=b")));
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }
}
