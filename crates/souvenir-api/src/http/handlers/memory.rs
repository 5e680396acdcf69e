//! Memory endpoints.
//!
//! POST /memory/save    - persist one user/assistant exchange
//! POST /memory/search  - semantic search over stored exchanges
//! POST /memory/context - assemble the reflective context block
//!
//! All three are thin adapters over [`MemoryService`]: no business logic
//! lives here. Missing text fields deserialize to empty strings rather
//! than rejecting the request, and downstream failures come back as
//! degraded bodies (`success: false`, empty results, minimal context)
//! with HTTP 200.
//!
//! [`MemoryService`]: souvenir_core::memory::service::MemoryService

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use souvenir_types::exchange::ScoredExchange;

use crate::state::AppState;

/// Request body for `POST /memory/save`.
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub user_message: String,

    #[serde(default)]
    pub ai_response: String,

    /// Model that produced the response; recorded as the configured default
    /// when absent.
    pub model_used: Option<String>,

    /// Conversation grouping key; a time-derived one is generated when
    /// absent or empty.
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
}

/// Request body for `POST /memory/search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,

    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    5
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// One scored hit on the wire.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub score: f32,
    pub user_message: String,
    pub ai_response: String,
    pub model_used: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ScoredExchange> for SearchResult {
    fn from(hit: ScoredExchange) -> Self {
        Self {
            score: hit.score,
            user_message: hit.exchange.user_message,
            ai_response: hit.exchange.ai_response,
            model_used: hit.exchange.model_used,
            session_id: hit.exchange.session_id,
            timestamp: hit.exchange.timestamp,
        }
    }
}

/// Request body for `POST /memory/context`.
#[derive(Debug, Deserialize)]
pub struct ContextRequest {
    #[serde(default)]
    pub query: String,

    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub context: String,
}

/// POST /memory/save - Persist one exchange.
pub async fn save_exchange(
    State(state): State<AppState>,
    Json(body): Json<SaveRequest>,
) -> Json<SaveResponse> {
    let success = state
        .memory
        .save_exchange(
            body.user_message,
            body.ai_response,
            body.model_used,
            body.session_id,
        )
        .await;

    Json(SaveResponse { success })
}

/// POST /memory/search - Semantic search over stored exchanges.
pub async fn search_memory(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let results = state
        .memory
        .search_similar(&body.query, body.limit)
        .await
        .into_iter()
        .map(SearchResult::from)
        .collect();

    Json(SearchResponse { results })
}

/// POST /memory/context - Assemble the reflective context block.
pub async fn get_context(
    State(state): State<AppState>,
    Json(body): Json<ContextRequest>,
) -> Json<ContextResponse> {
    let context = state
        .memory
        .reflective_context(&body.query, body.session_id.as_deref())
        .await;

    Json(ContextResponse { context })
}
