//! Conversation turn types and the conversation store trait.
//!
//! Turn persistence is a collaborator concern: the orchestrator records
//! turns fire-and-forget and a storage failure must never block a reply.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConversationError;

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    /// The end user asking questions
    Guest,
    /// A human operator on the tenant's side — never auto-answered
    Staff,
    /// The generated reply
    Assistant,
}

impl SenderRole {
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

/// A single recorded conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// The tenant this conversation belongs to
    pub tenant_id: String,

    /// The end-user/session identifier within the tenant
    pub client_id: String,

    /// Who sent this turn
    pub role: SenderRole,

    /// The text content
    pub text: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        role: SenderRole,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a guest turn.
    pub fn guest(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(tenant_id, client_id, SenderRole::Guest, text)
    }

    /// Create an assistant turn.
    pub fn assistant(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(tenant_id, client_id, SenderRole::Assistant, text)
    }
}

/// The conversation store collaborator.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist one turn. Callers treat this as fire-and-forget.
    async fn record_turn(&self, turn: Turn) -> Result<(), ConversationError>;
}
