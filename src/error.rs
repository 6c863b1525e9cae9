//! # Client Error Types
//!
//! Unified error handling for job submission, polling and the CLI glue.

use thiserror::Error;

use crate::state_machine::StateMachineError;

/// Client operation result type
pub type ClientResult<T> = Result<T, ClientError>;

/// Error taxonomy for a single job invocation
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP call itself failed (DNS, TCP, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Transport failure reported by a non-reqwest transport
    #[error("HTTP request failed: {0}")]
    TransportMessage(String),

    /// Non-200/202 status on submission or polling
    #[error("Server rejected job: HTTP {status} - {body}")]
    ServerRejected { status: u16, body: String },

    /// A 202 response carried no usable poll URL
    #[error("Server accepted job (HTTP {status}) but returned no Location header")]
    MissingLocationHeader { status: u16 },

    /// Retry budget exhausted while the server kept answering 202
    #[error("Job did not complete after {attempts} poll attempts at {poll_url}")]
    PollTimeout { attempts: u32, poll_url: String },

    /// The caller's cancellation token fired
    #[error("Job cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("JSON serialization/deserialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to decode response body: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Job state error: {0}")]
    StateTransition(#[from] StateMachineError),
}

impl ClientError {
    /// Create a server rejection from a status code and response body
    pub fn server_rejected(status: u16, body: impl Into<String>) -> Self {
        Self::ServerRejected {
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the job may still complete on the server side.
    ///
    /// Only a poll timeout leaves the remote job in an unknown state; every
    /// other error is either a definitive failure or never reached the server.
    #[must_use]
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::PollTimeout { .. })
    }

    /// Check if error is transient (worth retrying the whole job)
    ///
    /// The client never acts on this itself. Callers that layer their own
    /// outer retry around `execute` use it to decide.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::TransportMessage(_) => true,
            Self::ServerRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
