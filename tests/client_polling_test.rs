//! Submission and poll-loop behaviour against a scripted transport.
//!
//! Every test runs on a paused tokio clock: sleeps complete instantly while
//! `Instant` still reports the simulated time that passed.

mod common;

use common::*;
use pdf4me_client::{
    ClientError, ExponentialBackoff, FixedDelay, JobOutput, JobRequest, JobResponse, JobState,
    RawResponse, ResultKind,
};
use serde_json::{json, Map};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const DELAY: Duration = Duration::from_secs(10);

fn merge_request() -> JobRequest {
    let mut payload = Map::new();
    payload.insert("docContent".into(), json!(["JVBERi0x", "JVBERi0y"]));
    payload.insert("docName".into(), json!("merged.pdf"));
    JobRequest::new("/api/v2/Merge", payload)
}

#[tokio::test(start_paused = true)]
async fn synchronous_200_completes_without_polling() {
    let transport = ScriptedTransport::new().on_post(ok("PDF-BYTES"));
    let (client, transport) = scripted_client(transport, FixedDelay::default());

    let started = Instant::now();
    let output = client
        .execute(&merge_request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output, JobOutput::Bytes(b"PDF-BYTES".to_vec()));
    assert_eq!(transport.post_count(), 1);
    assert!(transport.get_urls().is_empty());
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn submission_carries_auth_header_and_async_hint() {
    let transport = ScriptedTransport::new().on_post(ok("x"));
    let (client, transport) = scripted_client(transport, FixedDelay::default());

    client
        .execute(&merge_request(), &CancellationToken::new())
        .await
        .unwrap();

    match &transport.calls()[0] {
        RecordedCall::Post {
            url,
            authorization,
            body,
        } => {
            assert_eq!(url, "http://mock/api/v2/Merge");
            assert_eq!(authorization, "Basic test-key");
            assert_eq!(body["async"], json!(true));
            assert_eq!(body["docName"], json!("merged.pdf"));
        }
        other => panic!("expected POST, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn polls_only_the_location_url() {
    let transport = ScriptedTransport::new()
        .on_post(accepted(MOCK_POLL_URL))
        .on_get_times(processing(), 2)
        .on_get(ok("done"));
    let (client, transport) = scripted_client(transport, FixedDelay::default());

    client
        .execute(&merge_request(), &CancellationToken::new())
        .await
        .unwrap();

    let gets = transport.get_urls();
    assert_eq!(gets.len(), 3);
    assert!(gets.iter().all(|url| url == MOCK_POLL_URL));
    for call in transport.calls() {
        if let RecordedCall::Get { authorization, .. } = call {
            assert_eq!(authorization, "Basic test-key");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn sleeps_before_every_poll() {
    let rounds = 3;
    let transport = ScriptedTransport::new()
        .on_post(accepted(MOCK_POLL_URL))
        .on_get_times(processing(), rounds)
        .on_get(ok("final body"));
    let (client, transport) = scripted_client(transport, FixedDelay::new(10, DELAY));

    let started = Instant::now();
    let output = client
        .execute(&merge_request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output.as_bytes(), b"final body");
    assert_eq!(transport.get_urls().len(), rounds + 1);
    assert_eq!(started.elapsed(), DELAY * (rounds as u32 + 1));
}

#[tokio::test(start_paused = true)]
async fn exhausted_budget_is_poll_timeout() {
    let transport = ScriptedTransport::new()
        .on_post(accepted(MOCK_POLL_URL))
        .on_get_times(processing(), 5);
    let (client, transport) = scripted_client(transport, FixedDelay::new(3, DELAY));

    let (result, machine) = client
        .execute_tracked(&merge_request(), &CancellationToken::new())
        .await;

    match result {
        Err(ClientError::PollTimeout { attempts, poll_url }) => {
            assert_eq!(attempts, 3);
            assert_eq!(poll_url, MOCK_POLL_URL);
        }
        other => panic!("expected PollTimeout, got {other:?}"),
    }
    assert_eq!(transport.get_urls().len(), 3);
    assert_eq!(machine.current_state(), JobState::DoneTimeout);
}

#[tokio::test(start_paused = true)]
async fn error_status_while_polling_fails_immediately() {
    let transport = ScriptedTransport::new()
        .on_post(accepted(MOCK_POLL_URL))
        .on_get(processing())
        .on_get(RawResponse::new(500, "conversion engine crashed"))
        .on_get(ok("never read"));
    let (client, transport) = scripted_client(transport, FixedDelay::default());

    let (result, machine) = client
        .execute_tracked(&merge_request(), &CancellationToken::new())
        .await;

    match result {
        Err(ClientError::ServerRejected { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "conversion engine crashed");
        }
        other => panic!("expected ServerRejected, got {other:?}"),
    }
    assert_eq!(transport.get_urls().len(), 2);
    assert_eq!(machine.current_state(), JobState::DoneFailure);
}

#[tokio::test(start_paused = true)]
async fn accepted_without_location_is_protocol_error() {
    let transport = ScriptedTransport::new()
        .on_post(processing())
        .on_get(ok("never read"));
    let (client, transport) = scripted_client(transport, FixedDelay::default());

    let (result, machine) = client
        .execute_tracked(&merge_request(), &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(ClientError::MissingLocationHeader { status: 202 })
    ));
    assert!(transport.get_urls().is_empty());
    assert_eq!(machine.current_state(), JobState::DoneFailure);
}

#[tokio::test(start_paused = true)]
async fn rejected_submission_is_returned_by_submit_and_raised_by_execute() {
    let transport = ScriptedTransport::new()
        .on_post(RawResponse::new(401, "invalid api key"))
        .on_post(RawResponse::new(401, "invalid api key"));
    let (client, transport) = scripted_client(transport, FixedDelay::default());
    let cancel = CancellationToken::new();

    let response = client.submit(&merge_request(), &cancel).await.unwrap();
    assert_eq!(
        response,
        JobResponse::Failed {
            status: 401,
            body: "invalid api key".into()
        }
    );

    let err = client.execute(&merge_request(), &cancel).await.unwrap_err();
    assert!(matches!(err, ClientError::ServerRejected { status: 401, .. }));
    assert!(!err.is_recoverable());
    assert_eq!(transport.post_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn identical_requests_are_submitted_twice() {
    let transport = ScriptedTransport::new()
        .on_post(ok("first"))
        .on_post(ok("second"));
    let (client, transport) = scripted_client(transport, FixedDelay::default());
    let request = merge_request();
    let cancel = CancellationToken::new();

    let first = client.execute(&request, &cancel).await.unwrap();
    let second = client.execute(&request, &cancel).await.unwrap();

    assert_eq!(first.as_bytes(), b"first");
    assert_eq!(second.as_bytes(), b"second");
    assert_eq!(transport.post_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn end_to_end_accepted_then_done_bytes() {
    let transport = ScriptedTransport::new()
        .on_post(accepted("http://mock/status/123"))
        .on_get(processing())
        .on_get(ok("DONE-BYTES"));
    let (client, transport) = scripted_client(transport, FixedDelay::default());

    let started = Instant::now();
    let (result, machine) = client
        .execute_tracked(&merge_request(), &CancellationToken::new())
        .await;

    assert_eq!(result.unwrap(), JobOutput::Bytes(b"DONE-BYTES".to_vec()));
    assert_eq!(transport.get_urls(), vec!["http://mock/status/123"; 2]);
    assert!(started.elapsed() >= DELAY * 2);
    assert_eq!(machine.current_state(), JobState::DoneSuccess);
    assert_eq!(
        machine.transitions(),
        &[
            (JobState::Submitted, JobState::Polling),
            (JobState::Polling, JobState::Polling),
            (JobState::Polling, JobState::DoneSuccess),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn relative_location_resolves_against_submission_url() {
    let transport = ScriptedTransport::new()
        .on_post(accepted("/status/7"))
        .on_get(ok("done"));
    let (client, transport) = scripted_client(transport, FixedDelay::default());

    client
        .execute(&merge_request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(transport.get_urls(), vec!["http://mock/status/7"]);
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_sleep_skips_next_poll() {
    let transport = ScriptedTransport::new()
        .on_post(accepted(MOCK_POLL_URL))
        .on_get_times(processing(), 10);
    let (client, transport) = scripted_client(transport, FixedDelay::default());
    let cancel = CancellationToken::new();
    let request = merge_request();

    // First GET happens at 10s, the second would happen at 20s
    let canceller = async {
        tokio::time::sleep(Duration::from_secs(15)).await;
        cancel.cancel();
    };
    let ((result, machine), ()) = tokio::join!(client.execute_tracked(&request, &cancel), canceller);

    assert!(matches!(result, Err(ClientError::Cancelled)));
    assert_eq!(transport.get_urls().len(), 1);
    assert_eq!(machine.current_state(), JobState::DoneCancelled);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_in_flight_poll() {
    let transport = ScriptedTransport::new()
        .with_get_latency(Duration::from_secs(5))
        .on_post(accepted(MOCK_POLL_URL))
        .on_get(ok("too late"));
    let (client, transport) = scripted_client(transport, FixedDelay::default());
    let cancel = CancellationToken::new();
    let request = merge_request();

    let started = Instant::now();
    let canceller = async {
        tokio::time::sleep(Duration::from_secs(12)).await;
        cancel.cancel();
    };
    let (result, ()) = tokio::join!(client.execute(&request, &cancel), canceller);

    assert!(matches!(result, Err(ClientError::Cancelled)));
    assert_eq!(transport.get_urls().len(), 1);
    assert_eq!(started.elapsed(), Duration::from_secs(12));
}

#[tokio::test(start_paused = true)]
async fn transport_failure_while_polling_is_fatal() {
    let transport = ScriptedTransport::new()
        .on_post(accepted(MOCK_POLL_URL))
        .on_get_error("connection reset")
        .on_get(ok("never read"));
    let (client, transport) = scripted_client(transport, FixedDelay::default());

    let (result, machine) = client
        .execute_tracked(&merge_request(), &CancellationToken::new())
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, ClientError::TransportMessage(_)));
    assert!(err.is_recoverable());
    assert_eq!(transport.get_urls().len(), 1);
    assert_eq!(machine.current_state(), JobState::DoneFailure);
}

#[tokio::test(start_paused = true)]
async fn exponential_backoff_grows_and_caps() {
    let transport = ScriptedTransport::new()
        .on_post(accepted(MOCK_POLL_URL))
        .on_get_times(processing(), 4);
    let policy = ExponentialBackoff::new(
        4,
        Duration::from_secs(1),
        2.0,
        Duration::from_secs(3),
    );
    let (client, transport) = scripted_client(transport, policy);

    let started = Instant::now();
    let err = client
        .execute(&merge_request(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_indeterminate());
    assert_eq!(transport.get_urls().len(), 4);
    // 1s + 2s + 3s (capped) + 3s (capped)
    assert_eq!(started.elapsed(), Duration::from_secs(9));
}

#[tokio::test(start_paused = true)]
async fn text_results_decode_as_json() {
    let transport = ScriptedTransport::new().on_get(ok(r#"{"pageCount":3,"title":"Invoice"}"#));
    let (client, transport) = scripted_client(transport, FixedDelay::new(2, DELAY));

    let output = client
        .poll(MOCK_POLL_URL, ResultKind::Text, &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(output, JobOutput::Text(_)));
    assert_eq!(output.json().unwrap()["pageCount"], json!(3));
    assert_eq!(transport.post_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn invalid_utf8_text_result_is_decode_error() {
    let transport = ScriptedTransport::new().on_post(RawResponse::new(200, vec![0xff, 0xfe]));
    let (client, _transport) = scripted_client(transport, FixedDelay::default());
    let request = merge_request().with_result_kind(ResultKind::Text);

    let err = client
        .execute(&request, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test(start_paused = true)]
async fn undecodable_poll_result_ends_in_failure_state() {
    let transport = ScriptedTransport::new()
        .on_post(accepted(MOCK_POLL_URL))
        .on_get(RawResponse::new(200, vec![0xff, 0xfe]));
    let (client, transport) = scripted_client(transport, FixedDelay::new(3, DELAY));
    let request = merge_request().with_result_kind(ResultKind::Text);

    let (result, machine) = client
        .execute_tracked(&request, &CancellationToken::new())
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
    assert_eq!(transport.get_urls().len(), 1);
    assert_eq!(machine.current_state(), JobState::DoneFailure);
    assert_eq!(machine.current_state(), JobState::for_error(&err));
    assert_eq!(
        machine.transitions(),
        &[
            (JobState::Submitted, JobState::Polling),
            (JobState::Polling, JobState::DoneFailure)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn zero_attempt_policy_times_out_without_polling() {
    let transport = ScriptedTransport::new().on_post(accepted(MOCK_POLL_URL));
    let (client, transport) = scripted_client(transport, FixedDelay::new(0, DELAY));

    let started = Instant::now();
    let (result, machine) = client
        .execute_tracked(&merge_request(), &CancellationToken::new())
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, ClientError::PollTimeout { attempts: 0, .. }));
    assert!(transport.get_urls().is_empty());
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(machine.current_state(), JobState::DoneTimeout);
    assert!(machine.current_state().is_terminal());
    assert_eq!(machine.current_state(), JobState::for_error(&err));
}

#[tokio::test(start_paused = true)]
async fn unparseable_poll_url_fails_without_requests() {
    let (client, transport) = scripted_client(ScriptedTransport::new(), FixedDelay::new(2, DELAY));

    let err = client
        .poll("::not a url::", ResultKind::Binary, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidUrl { .. }));
    assert!(transport.get_urls().is_empty());
}
