//! Generator trait — the abstraction over the remote text-generation backend.
//!
//! A Generator turns a fully-assembled prompt into a complete reply string.
//! The production implementation submits a job to the remote backend and
//! polls it to completion; tests use scripted stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::classify::DecodingProfile;
use crate::error::InferenceError;

/// A single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The fully-assembled prompt (preamble + context + user text)
    pub prompt: String,

    /// Decoding parameters from classification
    pub profile: DecodingProfile,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, profile: DecodingProfile) -> Self {
        Self {
            prompt: prompt.into(),
            profile,
        }
    }
}

/// The core Generator trait.
///
/// Either returns a complete, validated reply or a typed error — never a
/// partial or empty value. Retry policy belongs to the caller.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this backend ("job-poll", "stub").
    fn name(&self) -> &str;

    /// Generate a reply for the request.
    async fn generate(&self, request: GenerationRequest) -> Result<String, InferenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_through_json() {
        let req = GenerationRequest::new(
            "You are a helpful host.\n\nhello",
            DecodingProfile {
                temperature: 0.9,
                max_output_tokens: 120,
            },
        );
        let json = serde_json::to_string(&req).unwrap();
        let back: GenerationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.prompt, req.prompt);
        assert_eq!(back.profile.max_output_tokens, 120);
    }
}
