//! Vector store trait.
//!
//! Defines the interface for vector-indexed storage of chat exchanges.
//! Implementations (e.g., Qdrant, in-memory) live in souvenir-infra.

use souvenir_types::error::StoreError;
use souvenir_types::exchange::{Exchange, ScoredExchange};

/// Trait for vector-indexed exchange storage with semantic search.
///
/// All methods take the collection name explicitly so a single store
/// connection can serve multiple collections. Similarity is cosine
/// distance in every implementation.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in souvenir-infra.
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not exist.
    ///
    /// When the collection already exists, its configured dimensionality
    /// must match `dimension`; a mismatch is an error
    /// ([`StoreError::DimensionMismatch`]), not a silent re-create.
    fn ensure_collection(
        &self,
        collection: &str,
        dimension: usize,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Store an exchange under its id with the given embedding vector.
    ///
    /// Saves are append-only: ids are unique per exchange, so an upsert
    /// never overwrites a previously stored exchange.
    fn upsert(
        &self,
        collection: &str,
        exchange: &Exchange,
        vector: &[f32],
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Search for exchanges similar to the query vector.
    ///
    /// Returns up to `limit` results ordered by descending similarity score.
    fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ScoredExchange>, StoreError>> + Send;

    /// Scan exchanges whose `session_id` matches exactly.
    ///
    /// Returns up to `limit` matches in store order -- no chronological
    /// guarantee. Callers that need time ordering sort the result.
    fn scan_session(
        &self,
        collection: &str,
        session_id: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Exchange>, StoreError>> + Send;
}
