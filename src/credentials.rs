//! API key credentials injected into the client.

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ClientError, ClientResult};

/// Scheme token the PDF4me API expects in front of the raw key.
pub const AUTH_SCHEME: &str = "Basic";

/// Opaque PDF4me API key.
///
/// The value is sent verbatim after the `Basic` scheme token; it is not a
/// user:password pair and is never base64-encoded by the client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Wrap an API key, rejecting empty or whitespace-only values
    pub fn new(api_key: impl Into<String>) -> ClientResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ClientError::config_error("API key must not be empty"));
        }
        Ok(Self { api_key })
    }

    /// Raw key value
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Value for the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("{AUTH_SCHEME} {}", self.api_key)
    }

    /// `Authorization` header value, marked sensitive so it never shows up in
    /// reqwest's debug output
    pub fn header_value(&self) -> ClientResult<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.authorization())
            .map_err(|e| ClientError::config_error(format!("Invalid API key: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
