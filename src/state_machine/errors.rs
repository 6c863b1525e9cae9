use thiserror::Error;

use super::{events::JobEvent, states::JobState};

pub type StateMachineResult<T> = Result<T, StateMachineError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateMachineError {
    #[error("Invalid transition from {from} on {}", .event.event_type())]
    InvalidTransition { from: JobState, event: JobEvent },
}
