use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClientError;

/// Lifecycle of one job invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job POSTed, response not yet classified
    #[default]
    Submitted,
    /// Server accepted the job, polling the status URL
    Polling,
    /// Result received
    DoneSuccess,
    /// Server rejected the job or a poll
    DoneFailure,
    /// Retry budget exhausted while still processing
    DoneTimeout,
    /// Caller cancelled the job
    DoneCancelled,
}

impl JobState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::DoneSuccess | Self::DoneFailure | Self::DoneTimeout | Self::DoneCancelled
        )
    }

    /// Check if the job is still waiting on the server
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Submitted | Self::Polling)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::DoneSuccess)
    }

    /// Terminal state an error leaves a job in
    pub fn for_error(error: &ClientError) -> Self {
        match error {
            ClientError::Cancelled => Self::DoneCancelled,
            ClientError::PollTimeout { .. } => Self::DoneTimeout,
            _ => Self::DoneFailure,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Polling => write!(f, "polling"),
            Self::DoneSuccess => write!(f, "done_success"),
            Self::DoneFailure => write!(f, "done_failure"),
            Self::DoneTimeout => write!(f, "done_timeout"),
            Self::DoneCancelled => write!(f, "done_cancelled"),
        }
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "polling" => Ok(Self::Polling),
            "done_success" => Ok(Self::DoneSuccess),
            "done_failure" => Ok(Self::DoneFailure),
            "done_timeout" => Ok(Self::DoneTimeout),
            "done_cancelled" => Ok(Self::DoneCancelled),
            _ => Err(format!("Invalid job state: {s}")),
        }
    }
}
