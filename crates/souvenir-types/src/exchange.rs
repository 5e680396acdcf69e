//! Exchange types for Souvenir.
//!
//! An [`Exchange`] is one persisted user/assistant conversational turn.
//! Exchanges are write-once: created at save time, read back via similarity
//! search or session history, never updated or deleted by this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One stored conversational turn.
///
/// The embedding vector is derived from [`Exchange::combined_text`] and lives
/// in the vector store alongside this record; it is never supplied by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    /// UUIDv7 -- time-ordered with a random suffix, assigned at save time.
    pub id: Uuid,
    pub user_message: String,
    pub ai_response: String,
    /// Identifier of the model that produced `ai_response`.
    pub model_used: String,
    /// Grouping key correlating exchanges of one ongoing conversation.
    pub session_id: String,
    /// Assigned at save time, immutable afterward. Drives history ordering.
    pub timestamp: DateTime<Utc>,
}

impl Exchange {
    /// The exact text the embedding is computed from.
    pub fn combined_text(&self) -> String {
        format!("User: {}\nAI: {}", self.user_message, self.ai_response)
    }
}

/// A search hit: an exchange plus its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredExchange {
    pub exchange: Exchange,
    /// Cosine similarity score (higher is more similar).
    pub score: f32,
}

/// Session identifier generated when a caller saves without one.
///
/// Second-granularity on purpose: ungrouped exchanges saved in the same
/// second land in the same throwaway session, which is harmless, while
/// unrelated saves minutes apart stay separate.
pub fn fallback_session_id(at: DateTime<Utc>) -> String {
    format!("session_{}", at.timestamp())
}
