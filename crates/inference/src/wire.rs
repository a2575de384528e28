//! Wire types and the transport seam for the job-based backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use maitre_core::error::InferenceError;
use maitre_core::generate::GenerationRequest;

/// Submission payload sent to the backend.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl From<&GenerationRequest> for SubmitRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            prompt: request.prompt.clone(),
            temperature: request.profile.temperature,
            max_output_tokens: request.profile.max_output_tokens,
        }
    }
}

/// What the submission endpoint answered: a synchronous result, or a job
/// to poll.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubmitReply {
    Queued { job_id: String },
    Direct { result: String },
}

/// Job lifecycle states reported by the polling endpoint.
///
/// Anything the backend reports that we don't recognize maps to `Unknown`
/// and is treated as "not ready yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// One poll of `GET /v1/job/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusReply {
    pub status: JobState,

    #[serde(default)]
    pub result: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

/// The transport seam between the polling protocol and the network.
///
/// Production uses [`crate::HttpJobTransport`]; tests script the replies.
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// Submit a generation request.
    async fn submit(&self, request: &GenerationRequest) -> Result<SubmitReply, InferenceError>;

    /// Poll one job for its current status.
    async fn poll(&self, job_id: &str) -> Result<JobStatusReply, InferenceError>;
}
