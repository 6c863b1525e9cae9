use super::{
    errors::{StateMachineError, StateMachineResult},
    events::JobEvent,
    states::JobState,
};
use tracing::debug;
use uuid::Uuid;

/// State machine for one job invocation.
///
/// Owned by the task driving the job; never shared.
#[derive(Debug, Clone)]
pub struct JobStateMachine {
    job_id: Uuid,
    endpoint: String,
    state: JobState,
    transitions: Vec<(JobState, JobState)>,
}

impl JobStateMachine {
    /// Start a machine in `Submitted`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            endpoint: endpoint.into(),
            state: JobState::Submitted,
            transitions: Vec::new(),
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn current_state(&self) -> JobState {
        self.state
    }

    /// Every transition taken so far, oldest first
    pub fn transitions(&self) -> &[(JobState, JobState)] {
        &self.transitions
    }

    /// Apply an event, returning the new state
    pub fn transition(&mut self, event: JobEvent) -> StateMachineResult<JobState> {
        let target = Self::determine_target_state(self.state, &event)?;

        debug!(
            job_id = %self.job_id,
            endpoint = %self.endpoint,
            from = %self.state,
            to = %target,
            event = event.event_type(),
            status = event.status(),
            "Job state transition"
        );

        self.transitions.push((self.state, target));
        self.state = target;
        Ok(target)
    }

    /// Determine the target state based on current state and event
    fn determine_target_state(current: JobState, event: &JobEvent) -> StateMachineResult<JobState> {
        let target = match (current, event) {
            (JobState::Submitted, JobEvent::Completed) => JobState::DoneSuccess,
            (JobState::Submitted, JobEvent::Accepted) => JobState::Polling,
            (JobState::Submitted, JobEvent::Rejected { .. }) => JobState::DoneFailure,

            (JobState::Polling, JobEvent::Completed) => JobState::DoneSuccess,
            (
                JobState::Polling,
                JobEvent::StillProcessing {
                    attempt,
                    max_attempts,
                },
            ) => {
                if attempt < max_attempts {
                    JobState::Polling
                } else {
                    JobState::DoneTimeout
                }
            }
            (JobState::Polling, JobEvent::Rejected { .. }) => JobState::DoneFailure,

            (JobState::Submitted | JobState::Polling, JobEvent::TransportFailed) => {
                JobState::DoneFailure
            }
            (JobState::Submitted | JobState::Polling, JobEvent::Cancel) => JobState::DoneCancelled,

            (from, _) => {
                return Err(StateMachineError::InvalidTransition {
                    from,
                    event: event.clone(),
                })
            }
        };

        Ok(target)
    }
}
