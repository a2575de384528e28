//! HTTP transport for the job-based generation backend.

use async_trait::async_trait;
use tracing::trace;

use maitre_core::error::InferenceError;
use maitre_core::generate::GenerationRequest;

use crate::wire::{JobStatusReply, JobTransport, SubmitReply, SubmitRequest};

/// Per-HTTP-call timeout. Individual calls are short; the overall budget is
/// enforced by the polling client.
const HTTP_TIMEOUT_SECS: u64 = 10;

/// reqwest-based transport speaking the backend's submit/poll protocol.
pub struct HttpJobTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpJobTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl JobTransport for HttpJobTransport {
    async fn submit(&self, request: &GenerationRequest) -> Result<SubmitReply, InferenceError> {
        let url = format!("{}/v1/generate", self.base_url);
        let payload = SubmitRequest::from(request);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InferenceError::Backend {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<SubmitReply>()
            .await
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))
    }

    async fn poll(&self, job_id: &str) -> Result<JobStatusReply, InferenceError> {
        let url = format!("{}/v1/job/{}", self.base_url, job_id);
        trace!(%job_id, "polling job status");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InferenceError::Backend {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<JobStatusReply>()
            .await
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let transport = HttpJobTransport::new("http://llm.internal:9000/");
        assert_eq!(transport.base_url, "http://llm.internal:9000");
    }
}
