// Per-job state machine
//
// Tracks one invocation from submission to a terminal outcome. Terminal states
// accept no further events.

pub mod errors;
pub mod events;
pub mod job_state_machine;
pub mod states;

pub use errors::{StateMachineError, StateMachineResult};
pub use events::JobEvent;
pub use job_state_machine::JobStateMachine;
pub use states::JobState;
