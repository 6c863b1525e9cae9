use pdf4me_client::JobEvent;
use proptest::prelude::*;

/// Status codes the poll loop treats as fatal
pub fn error_status_strategy() -> impl Strategy<Value = u16> {
    (100u16..600).prop_filter("200 and 202 are not errors", |s| *s != 200 && *s != 202)
}

/// Number of 202 answers before the job finishes
pub fn processing_rounds_strategy() -> impl Strategy<Value = u32> {
    0u32..15
}

/// Poll budgets small enough to keep paused-clock runs short
pub fn max_attempts_strategy() -> impl Strategy<Value = u32> {
    1u32..10
}

/// Arbitrary job events
pub fn job_event_strategy() -> impl Strategy<Value = JobEvent> {
    prop_oneof![
        Just(JobEvent::Completed),
        Just(JobEvent::Accepted),
        (1u32..5, 1u32..5).prop_map(|(attempt, max_attempts)| JobEvent::StillProcessing {
            attempt,
            max_attempts
        }),
        (100u16..600).prop_map(|status| JobEvent::Rejected { status }),
        Just(JobEvent::TransportFailed),
        Just(JobEvent::Cancel),
    ]
}
