//! Memory service orchestrating exchange persistence and retrieval.
//!
//! MemoryService coordinates the Embedder and VectorStore to save chat
//! exchanges, search them by semantic similarity, reconstruct per-session
//! history, and assemble the reflective context block fed to the model.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use souvenir_types::config::MemoryConfig;
use souvenir_types::error::MemoryError;
use souvenir_types::exchange::{Exchange, ScoredExchange, fallback_session_id};
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::assembler::ContextAssembler;
use crate::memory::embedder::Embedder;
use crate::memory::vector::VectorStore;

/// Upper bound on points scanned when reconstructing a session's history.
///
/// The store applies its limit before any chronological sort, so which
/// points come back for an over-long session is store-dependent. Scanning
/// well past the requested window keeps the returned slice on the most
/// recent exchanges for any realistic session length; a session longer
/// than this bound may still lose its oldest entries.
const HISTORY_SCAN_LIMIT: usize = 256;

/// History window fetched for context assembly; only the tail is rendered.
const CONTEXT_HISTORY_LIMIT: usize = 5;

/// Most-recent exchanges rendered in the conversation-history section.
const CONTEXT_HISTORY_TAIL: usize = 3;

/// Similarity hits rendered in the similar-conversations section.
const CONTEXT_SIMILAR_LIMIT: usize = 3;

/// Orchestrates exchange persistence, similarity search, and history recall.
///
/// Generic over `Embedder` and `VectorStore` to maintain clean architecture
/// (souvenir-core never depends on souvenir-infra).
///
/// The retrieval and save operations never return errors: downstream
/// failures are logged and converted to `false` or an empty result so a
/// flaky embedder or store degrades responses instead of breaking them.
/// The one exception is [`ensure_ready`](MemoryService::ensure_ready),
/// which runs at startup and must surface problems loudly.
pub struct MemoryService<E: Embedder, S: VectorStore> {
    embedder: E,
    store: S,
    collection: String,
    default_model: String,
    embed_timeout: Duration,
    store_timeout: Duration,
}

impl<E: Embedder, S: VectorStore> MemoryService<E, S> {
    /// Create a new memory service over the given collaborators.
    pub fn new(embedder: E, store: S, config: &MemoryConfig) -> Self {
        Self {
            embedder,
            store,
            collection: config.collection.clone(),
            default_model: config.default_model.clone(),
            embed_timeout: Duration::from_secs(config.embed_timeout_secs),
            store_timeout: Duration::from_secs(config.store_timeout_secs),
        }
    }

    /// Override the embedder and store call timeouts (test hook).
    pub fn with_timeouts(mut self, embed_timeout: Duration, store_timeout: Duration) -> Self {
        self.embed_timeout = embed_timeout;
        self.store_timeout = store_timeout;
        self
    }

    /// Create the backing collection if needed and verify its dimensionality.
    ///
    /// Called once at startup. Unlike the per-request operations this
    /// propagates errors so the caller can tell a fatal configuration
    /// problem (an existing collection whose dimensionality does not match
    /// the embedder's) from an unreachable store it may choose to start
    /// degraded over.
    pub async fn ensure_ready(&self) -> Result<(), MemoryError> {
        self.bounded(
            "ensure_collection",
            self.store_timeout,
            self.store
                .ensure_collection(&self.collection, self.embedder.dimension()),
        )
        .await
    }

    // --- Persistence ---

    /// Save one user/AI exchange, reporting success as a flag.
    ///
    /// A missing `model_used` falls back to the configured default model; a
    /// missing or empty `session_id` falls back to a time-derived one.
    /// Empty message text is stored as-is, not rejected.
    ///
    /// Never returns an error: embedding or store failures are logged and
    /// reported as `false`.
    pub async fn save_exchange(
        &self,
        user_message: String,
        ai_response: String,
        model_used: Option<String>,
        session_id: Option<String>,
    ) -> bool {
        let now = Utc::now();
        let exchange = Exchange {
            id: Uuid::now_v7(),
            user_message,
            ai_response,
            model_used: model_used.unwrap_or_else(|| self.default_model.clone()),
            session_id: session_id
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| fallback_session_id(now)),
            timestamp: now,
        };

        match self.try_save(&exchange).await {
            Ok(()) => {
                info!(exchange_id = %exchange.id, session_id = %exchange.session_id, "Exchange saved");
                true
            }
            Err(error) => {
                warn!(error = %error, "Failed to save exchange");
                false
            }
        }
    }

    // --- Retrieval ---

    /// Search stored exchanges semantically similar to `query`.
    ///
    /// Returns at most `limit` results ordered by descending similarity
    /// score. No score threshold is applied: weak matches are returned
    /// rather than filtered. On any failure the result is empty.
    pub async fn search_similar(&self, query: &str, limit: usize) -> Vec<ScoredExchange> {
        if limit == 0 {
            return Vec::new();
        }
        match self.try_search(query, limit).await {
            Ok(hits) => hits,
            Err(error) => {
                warn!(error = %error, "Similarity search failed, returning no results");
                Vec::new()
            }
        }
    }

    /// Reconstruct a session's history in chronological order.
    ///
    /// Scans the store for exchanges with this exact `session_id`, sorts
    /// them ascending by timestamp, and keeps the most recent `limit`.
    /// The scan is bounded by [`HISTORY_SCAN_LIMIT`]; a session longer
    /// than the bound may lose its oldest entries. On any failure the
    /// result is empty.
    pub async fn session_history(&self, session_id: &str, limit: usize) -> Vec<Exchange> {
        match self.try_history(session_id, limit).await {
            Ok(exchanges) => exchanges,
            Err(error) => {
                warn!(error = %error, session_id, "History lookup failed, returning no results");
                Vec::new()
            }
        }
    }

    // --- Context assembly ---

    /// Assemble the reflective context block for the next model call.
    ///
    /// Gathers recent history for the session (when one is given) and the
    /// top similar exchanges for the query, then renders them with
    /// [`ContextAssembler::build`]. Retrieval failures shrink the block
    /// down to the minimal `User: {current_query}` line, never an error --
    /// this sits on the critical path of every model call.
    pub async fn reflective_context(
        &self,
        current_query: &str,
        session_id: Option<&str>,
    ) -> String {
        let history = match session_id {
            Some(session_id) if !session_id.is_empty() => {
                self.session_history(session_id, CONTEXT_HISTORY_LIMIT).await
            }
            _ => Vec::new(),
        };
        let tail_start = history.len().saturating_sub(CONTEXT_HISTORY_TAIL);
        let similar = self.search_similar(current_query, CONTEXT_SIMILAR_LIMIT).await;

        ContextAssembler::build(current_query, &history[tail_start..], &similar)
    }

    // --- Internals ---

    async fn try_save(&self, exchange: &Exchange) -> Result<(), MemoryError> {
        let combined = exchange.combined_text();
        let vector = self
            .bounded("embed", self.embed_timeout, self.embedder.embed(&combined))
            .await?;
        self.bounded(
            "upsert",
            self.store_timeout,
            self.store.upsert(&self.collection, exchange, &vector),
        )
        .await
    }

    async fn try_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredExchange>, MemoryError> {
        let vector = self
            .bounded("embed", self.embed_timeout, self.embedder.embed(query))
            .await?;
        let mut hits = self
            .bounded(
                "search",
                self.store_timeout,
                self.store.search(&self.collection, &vector, limit),
            )
            .await?;

        // Stores are expected to rank results; re-sorting and capping here
        // keeps the contract independent of backend quirks.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn try_history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Exchange>, MemoryError> {
        let scan_limit = limit.max(HISTORY_SCAN_LIMIT);
        let mut exchanges = self
            .bounded(
                "scan",
                self.store_timeout,
                self.store
                    .scan_session(&self.collection, session_id, scan_limit),
            )
            .await?;

        exchanges.sort_by_key(|exchange| exchange.timestamp);
        if exchanges.len() > limit {
            exchanges.drain(..exchanges.len() - limit);
        }
        Ok(exchanges)
    }

    /// Run a downstream call under a timeout.
    ///
    /// A hung embedder or store must not block the calling chat UI, so
    /// every downstream future is bounded. No retries are performed; a
    /// failed call is reported once.
    async fn bounded<T, Err, F>(
        &self,
        operation: &'static str,
        limit: Duration,
        fut: F,
    ) -> Result<T, MemoryError>
    where
        F: Future<Output = Result<T, Err>>,
        MemoryError: From<Err>,
    {
        match timeout(limit, fut).await {
            Ok(result) => result.map_err(MemoryError::from),
            Err(_) => Err(MemoryError::Timeout {
                operation,
                timeout_ms: limit.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;
    use souvenir_types::error::{EmbedError, StoreError};
    use tokio::time::sleep;

    use super::*;

    struct StubEmbedder {
        dimension: usize,
    }

    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(vec![text.len() as f32; self.dimension])
        }

        fn model_name(&self) -> &str {
            "stub-embedder"
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Err(EmbedError::ModelUnavailable("stub offline".into()))
        }

        fn model_name(&self) -> &str {
            "failing-embedder"
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    struct SlowEmbedder {
        delay: Duration,
    }

    impl Embedder for SlowEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            sleep(self.delay).await;
            Ok(vec![0.0; 4])
        }

        fn model_name(&self) -> &str {
            "slow-embedder"
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    /// In-memory store that records upserts in insertion order.
    ///
    /// `search` ignores the limit and returns ascending scores, and
    /// `scan_session` returns insertion order, so tests prove the service
    /// re-sorts and caps rather than trusting the backend.
    struct RecordingStore {
        exchanges: Mutex<Vec<Exchange>>,
        fail: bool,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                exchanges: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn offline() -> Self {
            Self {
                exchanges: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn with_exchanges(exchanges: Vec<Exchange>) -> Self {
            Self {
                exchanges: Mutex::new(exchanges),
                fail: false,
            }
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.fail {
                Err(StoreError::Connection("stub offline".into()))
            } else {
                Ok(())
            }
        }
    }

    impl VectorStore for RecordingStore {
        async fn ensure_collection(
            &self,
            _collection: &str,
            _dimension: usize,
        ) -> Result<(), StoreError> {
            self.check()
        }

        async fn upsert(
            &self,
            _collection: &str,
            exchange: &Exchange,
            _vector: &[f32],
        ) -> Result<(), StoreError> {
            self.check()?;
            self.exchanges.lock().unwrap().push(exchange.clone());
            Ok(())
        }

        async fn search(
            &self,
            _collection: &str,
            _vector: &[f32],
            _limit: usize,
        ) -> Result<Vec<ScoredExchange>, StoreError> {
            self.check()?;
            let exchanges = self.exchanges.lock().unwrap();
            Ok(exchanges
                .iter()
                .enumerate()
                .map(|(i, exchange)| ScoredExchange {
                    exchange: exchange.clone(),
                    score: 0.1 * (i as f32 + 1.0),
                })
                .collect())
        }

        async fn scan_session(
            &self,
            _collection: &str,
            session_id: &str,
            limit: usize,
        ) -> Result<Vec<Exchange>, StoreError> {
            self.check()?;
            let exchanges = self.exchanges.lock().unwrap();
            Ok(exchanges
                .iter()
                .filter(|exchange| exchange.session_id == session_id)
                .take(limit)
                .cloned()
                .collect())
        }
    }

    /// Store whose upsert hangs long enough to trip the timeout.
    struct SlowStore {
        delay: Duration,
    }

    impl VectorStore for SlowStore {
        async fn ensure_collection(
            &self,
            _collection: &str,
            _dimension: usize,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn upsert(
            &self,
            _collection: &str,
            _exchange: &Exchange,
            _vector: &[f32],
        ) -> Result<(), StoreError> {
            sleep(self.delay).await;
            Ok(())
        }

        async fn search(
            &self,
            _collection: &str,
            _vector: &[f32],
            _limit: usize,
        ) -> Result<Vec<ScoredExchange>, StoreError> {
            Ok(Vec::new())
        }

        async fn scan_session(
            &self,
            _collection: &str,
            _session_id: &str,
            _limit: usize,
        ) -> Result<Vec<Exchange>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn service<E: Embedder, S: VectorStore>(embedder: E, store: S) -> MemoryService<E, S> {
        MemoryService::new(embedder, store, &MemoryConfig::default())
    }

    fn exchange_at(session_id: &str, user: &str, ai: &str, hour: u32) -> Exchange {
        Exchange {
            id: Uuid::now_v7(),
            user_message: user.into(),
            ai_response: ai.into(),
            model_used: "test-model".into(),
            session_id: session_id.into(),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_save_fills_model_and_session_defaults() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::new());

        assert!(
            svc.save_exchange("hello".into(), "hi".into(), None, None)
                .await
        );

        let stored = svc.store.exchanges.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_message, "hello");
        assert_eq!(stored[0].ai_response, "hi");
        assert_eq!(stored[0].model_used, "phi3:3.8b");
        assert!(stored[0].session_id.starts_with("session_"));
    }

    #[tokio::test]
    async fn test_save_preserves_explicit_model_and_session() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::new());

        assert!(
            svc.save_exchange(
                "hello".into(),
                "hi".into(),
                Some("mistral:7b".into()),
                Some("s1".into()),
            )
            .await
        );

        let stored = svc.store.exchanges.lock().unwrap();
        assert_eq!(stored[0].model_used, "mistral:7b");
        assert_eq!(stored[0].session_id, "s1");
    }

    #[tokio::test]
    async fn test_save_empty_session_falls_back_but_empty_model_kept() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::new());

        assert!(
            svc.save_exchange("q".into(), "a".into(), Some(String::new()), Some(String::new()))
                .await
        );

        let stored = svc.store.exchanges.lock().unwrap();
        // An explicitly empty model is stored as-is; only an absent one
        // gets the default. Empty session ids always fall back.
        assert_eq!(stored[0].model_used, "");
        assert!(stored[0].session_id.starts_with("session_"));
    }

    #[tokio::test]
    async fn test_save_accepts_empty_messages() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::new());

        assert!(
            svc.save_exchange(String::new(), String::new(), None, Some("s1".into()))
                .await
        );
        assert_eq!(svc.store.exchanges.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_returns_false_when_store_offline() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::offline());

        assert!(
            !svc.save_exchange("hello".into(), "hi".into(), None, None)
                .await
        );
    }

    #[tokio::test]
    async fn test_save_returns_false_when_embedder_fails() {
        let svc = service(FailingEmbedder, RecordingStore::new());

        assert!(
            !svc.save_exchange("hello".into(), "hi".into(), None, None)
                .await
        );
        assert!(svc.store.exchanges.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_saving_same_content_twice_yields_two_exchanges() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::new());

        assert!(
            svc.save_exchange("dup".into(), "dup".into(), None, Some("s1".into()))
                .await
        );
        assert!(
            svc.save_exchange("dup".into(), "dup".into(), None, Some("s1".into()))
                .await
        );

        let stored = svc.store.exchanges.lock().unwrap();
        assert_eq!(stored.len(), 2);
        assert_ne!(stored[0].id, stored[1].id);
    }

    #[tokio::test]
    async fn test_save_then_history_roundtrip() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::new());

        assert!(
            svc.save_exchange(
                "Hello".into(),
                "Hi there".into(),
                Some("modelA".into()),
                Some("s1".into()),
            )
            .await
        );
        assert!(
            svc.save_exchange(
                "How are you".into(),
                "Good".into(),
                Some("modelA".into()),
                Some("s1".into()),
            )
            .await
        );

        let history = svc.session_history("s1", 10).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_message, "Hello");
        assert_eq!(history[0].ai_response, "Hi there");
        assert_eq!(history[1].user_message, "How are you");
        assert_eq!(history[1].ai_response, "Good");
    }

    #[tokio::test]
    async fn test_search_caps_results_and_sorts_descending() {
        let exchanges = vec![
            exchange_at("s1", "a", "ra", 9),
            exchange_at("s1", "b", "rb", 10),
            exchange_at("s1", "c", "rc", 11),
            exchange_at("s1", "d", "rd", 12),
        ];
        let svc = service(
            StubEmbedder { dimension: 4 },
            RecordingStore::with_exchanges(exchanges),
        );

        // The stub store returns every exchange with ascending scores.
        let hits = svc.search_similar("query", 2).await;
        assert_eq!(hits.len(), 2);
        assert!(hits[0].score >= hits[1].score);
        assert_eq!(hits[0].exchange.user_message, "d");
        assert_eq!(hits[1].exchange.user_message, "c");
    }

    #[tokio::test]
    async fn test_search_empty_store_returns_empty() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::new());
        assert!(svc.search_similar("anything", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_returns_empty_when_store_offline() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::offline());
        assert!(svc.search_similar("anything", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_returns_empty_when_embedder_fails() {
        let svc = service(FailingEmbedder, RecordingStore::new());
        assert!(svc.search_similar("anything", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_zero_limit_returns_empty() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::new());
        assert!(svc.search_similar("anything", 0).await.is_empty());
    }

    #[tokio::test]
    async fn test_history_sorts_ascending_and_keeps_most_recent() {
        // Insertion order is deliberately scrambled relative to timestamps.
        let exchanges = vec![
            exchange_at("s1", "third", "r3", 12),
            exchange_at("s1", "first", "r1", 9),
            exchange_at("other", "noise", "rn", 10),
            exchange_at("s1", "fourth", "r4", 13),
            exchange_at("s1", "second", "r2", 11),
        ];
        let svc = service(
            StubEmbedder { dimension: 4 },
            RecordingStore::with_exchanges(exchanges),
        );

        let history = svc.session_history("s1", 2).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_message, "third");
        assert_eq!(history[1].user_message, "fourth");
        assert!(history[0].timestamp <= history[1].timestamp);
    }

    #[tokio::test]
    async fn test_history_returns_empty_when_store_offline() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::offline());
        assert!(svc.session_history("s1", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_ensure_ready_propagates_store_errors() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::new());
        assert!(svc.ensure_ready().await.is_ok());

        let offline = service(StubEmbedder { dimension: 4 }, RecordingStore::offline());
        assert!(offline.ensure_ready().await.is_err());
    }

    #[tokio::test]
    async fn test_slow_embedder_is_timed_out() {
        let svc = service(
            SlowEmbedder {
                delay: Duration::from_millis(200),
            },
            RecordingStore::new(),
        )
        .with_timeouts(Duration::from_millis(10), Duration::from_millis(10));

        assert!(!svc.save_exchange("q".into(), "a".into(), None, None).await);
        assert!(svc.search_similar("q", 5).await.is_empty());
        assert!(svc.store.exchanges.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slow_store_is_timed_out() {
        let svc = service(
            StubEmbedder { dimension: 4 },
            SlowStore {
                delay: Duration::from_millis(200),
            },
        )
        .with_timeouts(Duration::from_millis(50), Duration::from_millis(10));

        assert!(!svc.save_exchange("q".into(), "a".into(), None, None).await);
    }

    #[tokio::test]
    async fn test_reflective_context_minimal_when_store_offline() {
        let svc = service(StubEmbedder { dimension: 4 }, RecordingStore::offline());

        let context = svc.reflective_context("what now?", Some("s1")).await;
        assert_eq!(context, "User: what now?");
    }

    #[tokio::test]
    async fn test_reflective_context_renders_history_and_similar() {
        let exchanges = vec![
            exchange_at("s1", "one", "r1", 9),
            exchange_at("s1", "two", "r2", 10),
            exchange_at("s1", "three", "r3", 11),
            exchange_at("s1", "four", "r4", 12),
        ];
        let svc = service(
            StubEmbedder { dimension: 4 },
            RecordingStore::with_exchanges(exchanges),
        );

        let context = svc.reflective_context("next question", Some("s1")).await;

        assert!(context.starts_with("=== Historique de la conversation ==="));
        assert!(context.contains("=== Conversations similaires ==="));
        assert!(context.ends_with("=== Contexte actuel ===\nUser: next question"));
        // Only the last three exchanges make the history section.
        assert!(!context.contains("User: one\nAI: r1"));
        assert!(context.contains("User: two\nAI: r2"));
    }

    #[tokio::test]
    async fn test_reflective_context_skips_history_without_session() {
        let exchanges = vec![exchange_at("s1", "one", "r1", 9)];
        let svc = service(
            StubEmbedder { dimension: 4 },
            RecordingStore::with_exchanges(exchanges),
        );

        let with_none = svc.reflective_context("q", None).await;
        assert!(!with_none.contains("=== Historique de la conversation ==="));

        let with_empty = svc.reflective_context("q", Some("")).await;
        assert!(!with_empty.contains("=== Historique de la conversation ==="));
    }
}
