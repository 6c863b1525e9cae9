use serde::{Deserialize, Serialize};

/// Observations that move a job between states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum JobEvent {
    /// HTTP 200 on submission or poll
    Completed,
    /// HTTP 202 on submission with a poll URL
    Accepted,
    /// HTTP 202 on a poll; `attempt` is 1-based
    StillProcessing { attempt: u32, max_attempts: u32 },
    /// Any other status, or a protocol violation
    Rejected { status: u16 },
    /// The HTTP call itself failed
    TransportFailed,
    /// Cancellation token fired
    Cancel,
}

impl JobEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Accepted => "accepted",
            Self::StillProcessing { .. } => "still_processing",
            Self::Rejected { .. } => "rejected",
            Self::TransportFailed => "transport_failed",
            Self::Cancel => "cancel",
        }
    }

    /// HTTP status carried by the event, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Completed => Some(200),
            Self::Accepted | Self::StillProcessing { .. } => Some(202),
            Self::Rejected { status } => Some(*status),
            Self::TransportFailed | Self::Cancel => None,
        }
    }
}
