//! Error types for the Maitre domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Maitre operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Cache errors ---
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    // --- Inference errors ---
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    // --- Catalog errors ---
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    // --- Conversation errors ---
    #[error("Conversation error: {0}")]
    Conversation(#[from] ConversationError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from the shared cache backend.
///
/// These never cross the `CacheTier` boundary: the tier absorbs them by
/// retrying against the in-process fallback and logging the degradation.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Shared cache unavailable: {0}")]
    Unavailable(String),

    #[error("Shared cache operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Errors from the remote generation backend.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("Generation did not complete within the {budget_secs}s budget")]
    Timeout { budget_secs: u64 },

    #[error("Backend reported failure: {message} (status: {status_code})")]
    Backend { status_code: u16, message: String },

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors from the catalog provider collaborator.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Catalog unavailable for tenant {tenant_id}: {reason}")]
    Unavailable { tenant_id: String, reason: String },

    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),
}

/// Errors from the conversation store collaborator.
#[derive(Debug, Clone, Error)]
pub enum ConversationError {
    #[error("Storage error: {0}")]
    Storage(String),
}
