//! # Async Job Client
//!
//! Submits one PDF4me job, classifies the response, and when the server
//! answers `202 Accepted` polls the `Location` URL until the job succeeds,
//! fails, runs out of attempts, or is cancelled.
//!
//! Every operation in [`crate::operations`] goes through this one client;
//! nothing else implements polling.

use reqwest::header::HeaderValue;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::error::{ClientError, ClientResult};
use crate::job::{JobOutput, JobRequest, JobResponse, ResultKind};
use crate::logging::{log_error, log_job_operation};
use crate::poll::PollState;
use crate::policy::{FixedDelay, PollPolicy};
use crate::state_machine::{JobEvent, JobState, JobStateMachine};
use crate::transport::{HttpTransport, RawResponse, ReqwestTransport};

/// Job submission and polling client.
///
/// Cheap to clone; clones share the transport and policy. The client keeps
/// no per-job state, so one instance can drive any number of concurrent jobs.
///
/// # Examples
///
/// ```rust,no_run
/// use pdf4me_client::{AsyncJobClient, ClientConfig, Operation, PayloadBuilder};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::load()?;
/// let client = AsyncJobClient::new(&config)?;
///
/// let request = PayloadBuilder::for_operation(Operation::ConvertToPdf)
///     .document(std::fs::read("report.docx")?)
///     .doc_name("report.docx")
///     .build();
///
/// let output = client.execute(&request, &CancellationToken::new()).await?;
/// output.write_to("report.pdf".as_ref()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AsyncJobClient {
    transport: Arc<dyn HttpTransport>,
    authorization: HeaderValue,
    base_url: Url,
    policy: Arc<dyn PollPolicy>,
}

impl AsyncJobClient {
    /// Build a client from validated configuration using the reqwest transport
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.timeout())?;
        let mut client =
            Self::with_transport(Arc::new(transport), &config.base_url, &config.credentials()?)?;
        client.policy = config.polling.policy();

        info!(
            base_url = %client.base_url,
            max_attempts = client.policy.max_attempts(),
            timeout_ms = config.timeout_ms,
            "Created PDF4me job client"
        );
        Ok(client)
    }

    /// Build a client over any transport with the default poll policy
    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
        credentials: &Credentials,
    ) -> ClientResult<Self> {
        let mut base = Url::parse(base_url).map_err(|e| ClientError::invalid_url(base_url, e))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            transport,
            authorization: credentials.header_value()?,
            base_url: base,
            policy: Arc::new(FixedDelay::default()),
        })
    }

    /// Replace the poll policy
    #[must_use]
    pub fn with_policy(mut self, policy: impl PollPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn policy(&self) -> &dyn PollPolicy {
        self.policy.as_ref()
    }

    /// Absolute URL for an endpoint path. Absolute `http(s)` URLs pass
    /// through untouched.
    pub fn resolve_endpoint(&self, endpoint: &str) -> ClientResult<Url> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Url::parse(endpoint).map_err(|e| ClientError::invalid_url(endpoint, e));
        }
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| ClientError::invalid_url(endpoint, e))
    }

    /// POST the request once and classify the response.
    ///
    /// Never polls. A `202` without a usable `Location` header is a protocol
    /// violation and returns [`ClientError::MissingLocationHeader`].
    pub async fn submit(
        &self,
        request: &JobRequest,
        cancel: &CancellationToken,
    ) -> ClientResult<JobResponse> {
        let url = self.resolve_endpoint(&request.endpoint)?;
        let body = request.body();

        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        debug!(
            endpoint = %request.endpoint,
            url = %url,
            transport = self.transport.transport_name(),
            async_hint = request.async_hint,
            "Submitting job"
        );

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            response = self.transport.post_json(&url, &self.authorization, &body) => response?,
        };

        Self::classify_submission(&url, request.result_kind, response)
    }

    fn classify_submission(
        submit_url: &Url,
        result_kind: ResultKind,
        response: RawResponse,
    ) -> ClientResult<JobResponse> {
        match response.status {
            200 => Ok(JobResponse::Completed(JobOutput::decode(
                result_kind,
                response.body,
            )?)),
            202 => {
                let location = response
                    .location
                    .as_deref()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .ok_or(ClientError::MissingLocationHeader { status: 202 })?;
                // Relative locations are resolved against the submission URL
                let poll_url = submit_url
                    .join(location)
                    .map_err(|e| ClientError::invalid_url(location, e))?;
                Ok(JobResponse::Accepted {
                    poll_url: poll_url.to_string(),
                })
            }
            status => Ok(JobResponse::Failed {
                status,
                body: response.body_text(),
            }),
        }
    }

    /// Poll a status URL until the job completes.
    ///
    /// Sleeps `policy.delay_for(attempt)` before every GET, including the
    /// first. Returns [`ClientError::PollTimeout`] once the budget is spent on
    /// `202` answers, and [`ClientError::ServerRejected`] on the first other
    /// non-`200` status.
    pub async fn poll(
        &self,
        poll_url: &str,
        result_kind: ResultKind,
        cancel: &CancellationToken,
    ) -> ClientResult<JobOutput> {
        let mut machine = JobStateMachine::new(poll_url);
        machine.transition(JobEvent::Accepted)?;
        self.poll_with(&mut machine, poll_url, result_kind, cancel)
            .await
    }

    async fn poll_with(
        &self,
        machine: &mut JobStateMachine,
        poll_url: &str,
        result_kind: ResultKind,
        cancel: &CancellationToken,
    ) -> ClientResult<JobOutput> {
        let url = match Url::parse(poll_url) {
            Ok(url) => url,
            Err(e) => {
                let error = ClientError::invalid_url(poll_url, e);
                machine.transition(failure_event(&error))?;
                return Err(error);
            }
        };
        let mut state = PollState::new(poll_url, self.policy.max_attempts());

        while !state.is_exhausted() {
            let attempt = state.begin_attempt();

            if !sleep_unless_cancelled(self.policy.delay_for(attempt), cancel).await {
                return Self::cancel_job(machine, &state);
            }

            debug!(
                job_id = %machine.job_id(),
                poll_url = %poll_url,
                attempt = attempt,
                max_attempts = state.max_attempts(),
                "Polling job status"
            );

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Self::cancel_job(machine, &state),
                response = self.transport.get(&url, &self.authorization) => response,
            };

            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    machine.transition(JobEvent::TransportFailed)?;
                    warn!(
                        job_id = %machine.job_id(),
                        poll_url = %poll_url,
                        attempt = attempt,
                        error = %e,
                        "Poll request failed"
                    );
                    return Err(e);
                }
            };

            match response.status {
                200 => {
                    let output = match JobOutput::decode(result_kind, response.body) {
                        Ok(output) => output,
                        Err(e) => {
                            machine.transition(JobEvent::Rejected { status: 200 })?;
                            warn!(
                                job_id = %machine.job_id(),
                                poll_url = %poll_url,
                                attempt = attempt,
                                error = %e,
                                "Job result could not be decoded"
                            );
                            return Err(e);
                        }
                    };
                    machine.transition(JobEvent::Completed)?;
                    info!(
                        job_id = %machine.job_id(),
                        poll_url = %poll_url,
                        attempts = attempt,
                        elapsed_ms = state.elapsed().as_millis() as u64,
                        body_len = output.len(),
                        "Job completed"
                    );
                    return Ok(output);
                }
                202 => {
                    let next = machine.transition(JobEvent::StillProcessing {
                        attempt,
                        max_attempts: state.max_attempts(),
                    })?;
                    debug!(
                        job_id = %machine.job_id(),
                        attempt = attempt,
                        remaining = state.remaining(),
                        state = %next,
                        "Job still processing"
                    );
                }
                status => {
                    machine.transition(JobEvent::Rejected { status })?;
                    warn!(
                        job_id = %machine.job_id(),
                        poll_url = %poll_url,
                        attempt = attempt,
                        status = status,
                        "Poll returned error status"
                    );
                    return Err(ClientError::server_rejected(status, response.body_text()));
                }
            }
        }

        // A zero budget never reaches the 202 arm, so close out the job here
        if machine.current_state() == JobState::Polling {
            machine.transition(JobEvent::StillProcessing {
                attempt: state.attempts(),
                max_attempts: state.max_attempts(),
            })?;
        }

        warn!(
            job_id = %machine.job_id(),
            poll_url = %poll_url,
            attempts = state.attempts(),
            elapsed_ms = state.elapsed().as_millis() as u64,
            "Poll budget exhausted"
        );
        Err(ClientError::PollTimeout {
            attempts: state.attempts(),
            poll_url: poll_url.to_string(),
        })
    }

    fn cancel_job(machine: &mut JobStateMachine, state: &PollState) -> ClientResult<JobOutput> {
        machine.transition(JobEvent::Cancel)?;
        info!(
            job_id = %machine.job_id(),
            poll_url = %state.poll_url(),
            attempts_started = state.attempts(),
            "Job cancelled while polling"
        );
        Err(ClientError::Cancelled)
    }

    /// Submit and, when accepted, poll to completion.
    ///
    /// The request is POSTed exactly once. A non-`200`/`202` submission
    /// status becomes [`ClientError::ServerRejected`].
    pub async fn execute(
        &self,
        request: &JobRequest,
        cancel: &CancellationToken,
    ) -> ClientResult<JobOutput> {
        self.execute_tracked(request, cancel).await.0
    }

    /// [`execute`](Self::execute), also returning the job's state machine so
    /// callers can inspect the terminal state and transition history
    pub async fn execute_tracked(
        &self,
        request: &JobRequest,
        cancel: &CancellationToken,
    ) -> (ClientResult<JobOutput>, JobStateMachine) {
        let mut machine = JobStateMachine::new(&request.endpoint);
        let result = self.drive(&mut machine, request, cancel).await;

        match &result {
            Ok(output) => log_job_operation(
                "execute",
                machine.job_id(),
                &request.endpoint,
                machine.current_state(),
                Some(&format!("{} bytes", output.len())),
            ),
            Err(e) => log_error(
                "async_job_client",
                "execute",
                &e.to_string(),
                Some(&format!(
                    "job_id={} endpoint={} state={}",
                    machine.job_id(),
                    request.endpoint,
                    machine.current_state()
                )),
            ),
        }

        (result, machine)
    }

    async fn drive(
        &self,
        machine: &mut JobStateMachine,
        request: &JobRequest,
        cancel: &CancellationToken,
    ) -> ClientResult<JobOutput> {
        log_job_operation(
            "submit",
            machine.job_id(),
            &request.endpoint,
            machine.current_state(),
            None,
        );

        let response = match self.submit(request, cancel).await {
            Ok(response) => response,
            Err(e) => {
                machine.transition(failure_event(&e))?;
                return Err(e);
            }
        };

        match response {
            JobResponse::Completed(output) => {
                machine.transition(JobEvent::Completed)?;
                Ok(output)
            }
            JobResponse::Failed { status, body } => {
                machine.transition(JobEvent::Rejected { status })?;
                Err(ClientError::server_rejected(status, body))
            }
            JobResponse::Accepted { poll_url } => {
                machine.transition(JobEvent::Accepted)?;
                log_job_operation(
                    "accepted",
                    machine.job_id(),
                    &request.endpoint,
                    machine.current_state(),
                    Some(&poll_url),
                );
                self.poll_with(machine, &poll_url, request.result_kind, cancel)
                    .await
            }
        }
    }
}

/// Sleep for `delay`; `false` if the token fired first
async fn sleep_unless_cancelled(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

/// Event recorded when submission itself fails
fn failure_event(error: &ClientError) -> JobEvent {
    match error {
        ClientError::Cancelled => JobEvent::Cancel,
        ClientError::MissingLocationHeader { status }
        | ClientError::ServerRejected { status, .. } => JobEvent::Rejected { status: *status },
        ClientError::Decode(_) => JobEvent::Rejected { status: 200 },
        _ => JobEvent::TransportFailed,
    }
}
