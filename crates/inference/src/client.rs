//! The polling generation client.
//!
//! Most jobs complete within a few seconds, so polling starts aggressive to
//! keep added latency low for the common case and backs off for the long
//! tail: every 200ms for the first 5s of waiting, every 500ms until 15s,
//! then every 1s until the wall-clock budget (default 30s) runs out.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use maitre_core::error::InferenceError;
use maitre_core::generate::{GenerationRequest, Generator};

use crate::http::HttpJobTransport;
use crate::wire::{JobState, JobTransport, SubmitReply};

const DEFAULT_BUDGET: Duration = Duration::from_secs(30);

/// Poll cadence for the current amount of elapsed waiting.
fn poll_interval(elapsed: Duration) -> Duration {
    if elapsed < Duration::from_secs(5) {
        Duration::from_millis(200)
    } else if elapsed < Duration::from_secs(15) {
        Duration::from_millis(500)
    } else {
        Duration::from_secs(1)
    }
}

/// Generation client for the job-based remote backend.
///
/// No retries happen here — a request ends in exactly one of: a complete
/// validated string, `Timeout`, `Backend`, or `MalformedResponse`.
pub struct JobPollClient {
    transport: Arc<dyn JobTransport>,
    budget: Duration,
}

impl JobPollClient {
    pub fn new(transport: Arc<dyn JobTransport>) -> Self {
        Self {
            transport,
            budget: DEFAULT_BUDGET,
        }
    }

    /// Convenience constructor over the HTTP transport.
    pub fn http(base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(HttpJobTransport::new(base_url)))
    }

    /// Override the overall wall-clock budget.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    fn validated(text: String) -> Result<String, InferenceError> {
        if text.trim().is_empty() {
            Err(InferenceError::MalformedResponse(
                "backend returned an empty result".into(),
            ))
        } else {
            Ok(text)
        }
    }

    async fn await_job(&self, job_id: &str, started: Instant) -> Result<String, InferenceError> {
        loop {
            let elapsed = started.elapsed();
            if elapsed >= self.budget {
                warn!(%job_id, elapsed_ms = elapsed.as_millis() as u64, "generation budget exhausted");
                return Err(InferenceError::Timeout {
                    budget_secs: self.budget.as_secs(),
                });
            }

            tokio::time::sleep(poll_interval(elapsed)).await;

            let reply = match self.transport.poll(job_id).await {
                Ok(reply) => reply,
                Err(e) => {
                    // A failed poll call is indistinguishable from "not
                    // ready yet" — keep going while budget remains.
                    debug!(%job_id, error = %e, "poll attempt failed, will retry");
                    continue;
                }
            };

            match reply.status {
                JobState::Completed => {
                    return match reply.result {
                        Some(text) => Self::validated(text),
                        None => Err(InferenceError::MalformedResponse(
                            "completed job carried no result".into(),
                        )),
                    };
                }
                JobState::Failed => {
                    return Err(InferenceError::Backend {
                        status_code: 502,
                        message: reply.error.unwrap_or_else(|| "job failed".into()),
                    });
                }
                JobState::Pending | JobState::Unknown => continue,
            }
        }
    }
}

#[async_trait]
impl Generator for JobPollClient {
    fn name(&self) -> &str {
        "job-poll"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, InferenceError> {
        let started = Instant::now();

        match self.transport.submit(&request).await? {
            SubmitReply::Direct { result } => {
                debug!("backend answered synchronously");
                Self::validated(result)
            }
            SubmitReply::Queued { job_id } => {
                debug!(%job_id, "backend queued a job");
                self.await_job(&job_id, started).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::JobStatusReply;
    use maitre_core::classify::DecodingProfile;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request() -> GenerationRequest {
        GenerationRequest::new("prompt", DecodingProfile::default())
    }

    fn completed(text: &str) -> Result<JobStatusReply, InferenceError> {
        Ok(JobStatusReply {
            status: JobState::Completed,
            result: Some(text.into()),
            error: None,
        })
    }

    fn pending() -> Result<JobStatusReply, InferenceError> {
        Ok(JobStatusReply {
            status: JobState::Pending,
            result: None,
            error: None,
        })
    }

    /// Transport that returns a scripted sequence of poll replies; the last
    /// entry repeats forever.
    struct ScriptedTransport {
        submit_reply: SubmitReply,
        polls: Mutex<Vec<Result<JobStatusReply, InferenceError>>>,
        poll_count: AtomicUsize,
    }

    impl ScriptedTransport {
        fn queued(polls: Vec<Result<JobStatusReply, InferenceError>>) -> Self {
            Self {
                submit_reply: SubmitReply::Queued {
                    job_id: "j-1".into(),
                },
                polls: Mutex::new(polls),
                poll_count: AtomicUsize::new(0),
            }
        }

        fn direct(result: &str) -> Self {
            Self {
                submit_reply: SubmitReply::Direct {
                    result: result.into(),
                },
                polls: Mutex::new(vec![]),
                poll_count: AtomicUsize::new(0),
            }
        }

        fn poll_count(&self) -> usize {
            self.poll_count.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl JobTransport for ScriptedTransport {
        async fn submit(
            &self,
            _request: &GenerationRequest,
        ) -> Result<SubmitReply, InferenceError> {
            Ok(self.submit_reply.clone())
        }

        async fn poll(&self, _job_id: &str) -> Result<JobStatusReply, InferenceError> {
            let index = self.poll_count.fetch_add(1, Ordering::Relaxed);
            let polls = self.polls.lock().unwrap();
            let clamped = index.min(polls.len().saturating_sub(1));
            polls[clamped].clone()
        }
    }

    #[test]
    fn schedule_tiers_match_the_contract() {
        assert_eq!(poll_interval(Duration::ZERO), Duration::from_millis(200));
        assert_eq!(
            poll_interval(Duration::from_millis(4_900)),
            Duration::from_millis(200)
        );
        assert_eq!(
            poll_interval(Duration::from_secs(5)),
            Duration::from_millis(500)
        );
        assert_eq!(
            poll_interval(Duration::from_millis(14_900)),
            Duration::from_millis(500)
        );
        assert_eq!(poll_interval(Duration::from_secs(15)), Duration::from_secs(1));
        assert_eq!(poll_interval(Duration::from_secs(29)), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn direct_result_skips_polling() {
        let transport = Arc::new(ScriptedTransport::direct("Hello!"));
        let client = JobPollClient::new(transport.clone());

        let text = client.generate(request()).await.unwrap();
        assert_eq!(text, "Hello!");
        assert_eq!(transport.poll_count(), 0);
    }

    #[tokio::test]
    async fn empty_direct_result_fails_closed() {
        let client = JobPollClient::new(Arc::new(ScriptedTransport::direct("   ")));
        let err = client.generate(request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn queued_job_completes_after_a_few_polls() {
        let transport = Arc::new(ScriptedTransport::queued(vec![
            pending(),
            pending(),
            completed("All done."),
        ]));
        let client = JobPollClient::new(transport.clone());

        let text = client.generate(request()).await.unwrap();
        assert_eq!(text, "All done.");
        assert_eq!(transport.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn never_completing_job_times_out_within_budget() {
        let transport = Arc::new(ScriptedTransport::queued(vec![pending()]));
        let client = JobPollClient::new(transport.clone());

        let started = Instant::now();
        let err = client.generate(request()).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, InferenceError::Timeout { budget_secs: 30 }));
        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed < Duration::from_secs(31), "took {elapsed:?}");
        // 25 polls in the 200ms tier, 20 in the 500ms tier, 15 in the 1s tier.
        assert_eq!(transport.poll_count(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn shorter_budget_is_honored() {
        let transport = Arc::new(ScriptedTransport::queued(vec![pending()]));
        let client = JobPollClient::new(transport).with_budget(Duration::from_secs(2));

        let started = Instant::now();
        let err = client.generate(request()).await.unwrap_err();

        assert!(matches!(err, InferenceError::Timeout { budget_secs: 2 }));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_surfaces_a_backend_error() {
        let transport = Arc::new(ScriptedTransport::queued(vec![
            pending(),
            Ok(JobStatusReply {
                status: JobState::Failed,
                result: None,
                error: Some("model worker crashed".into()),
            }),
        ]));
        let client = JobPollClient::new(transport);

        let err = client.generate(request()).await.unwrap_err();
        match err {
            InferenceError::Backend { message, .. } => {
                assert!(message.contains("model worker crashed"));
            }
            other => panic!("expected Backend error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completed_job_with_empty_result_fails_closed() {
        let transport = Arc::new(ScriptedTransport::queued(vec![completed("")]));
        let client = JobPollClient::new(transport);

        let err = client.generate(request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_transport_errors_are_not_terminal() {
        let transport = Arc::new(ScriptedTransport::queued(vec![
            Err(InferenceError::Network("connection reset".into())),
            Err(InferenceError::Network("connection reset".into())),
            completed("Recovered."),
        ]));
        let client = JobPollClient::new(transport);

        let text = client.generate(request()).await.unwrap();
        assert_eq!(text, "Recovered.");
    }

    #[tokio::test]
    async fn submit_failure_is_terminal() {
        struct FailingSubmit;

        #[async_trait]
        impl JobTransport for FailingSubmit {
            async fn submit(
                &self,
                _request: &GenerationRequest,
            ) -> Result<SubmitReply, InferenceError> {
                Err(InferenceError::Backend {
                    status_code: 503,
                    message: "overloaded".into(),
                })
            }

            async fn poll(&self, _job_id: &str) -> Result<JobStatusReply, InferenceError> {
                unreachable!("submit never succeeded")
            }
        }

        let client = JobPollClient::new(Arc::new(FailingSubmit));
        let err = client.generate(request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Backend { status_code: 503, .. }));
    }
}
