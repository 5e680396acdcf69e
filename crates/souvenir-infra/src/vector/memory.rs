//! In-process vector store for development and tests.
//!
//! Implements `VectorStore` from `souvenir-core` with brute-force cosine
//! similarity over a `DashMap` of collections. Contents last only as long as
//! the process; production deployments use the Qdrant backend instead.

use dashmap::DashMap;

use souvenir_core::memory::vector::VectorStore;
use souvenir_types::error::StoreError;
use souvenir_types::exchange::{Exchange, ScoredExchange};

/// A stored exchange together with its embedding vector.
struct StoredPoint {
    exchange: Exchange,
    vector: Vec<f32>,
}

/// A named collection: a fixed dimension plus points in insertion order.
struct Collection {
    dimension: usize,
    points: Vec<StoredPoint>,
}

/// In-process implementation of the `VectorStore` trait.
///
/// Every operation is a brute-force scan, which is fine at dev and test
/// scale. Search ranks by cosine similarity so results agree with the
/// Qdrant backend's distance function.
pub struct InMemoryVectorStore {
    collections: DashMap<String, Collection>,
}

impl InMemoryVectorStore {
    /// Create an empty store with no collections.
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero norm, since there is nothing
/// meaningful to rank against.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(
        &self,
        collection: &str,
        dimension: usize,
    ) -> Result<(), StoreError> {
        let entry = self
            .collections
            .entry(collection.to_string())
            .or_insert_with(|| Collection {
                dimension,
                points: Vec::new(),
            });

        if entry.dimension != dimension {
            return Err(StoreError::DimensionMismatch {
                collection: collection.to_string(),
                expected: dimension,
                actual: entry.dimension,
            });
        }
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        exchange: &Exchange,
        vector: &[f32],
    ) -> Result<(), StoreError> {
        let mut entry = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionMissing(collection.to_string()))?;

        if vector.len() != entry.dimension {
            return Err(StoreError::DimensionMismatch {
                collection: collection.to_string(),
                expected: entry.dimension,
                actual: vector.len(),
            });
        }

        entry.points.push(StoredPoint {
            exchange: exchange.clone(),
            vector: vector.to_vec(),
        });
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredExchange>, StoreError> {
        let entry = self
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionMissing(collection.to_string()))?;

        let mut hits: Vec<ScoredExchange> = entry
            .points
            .iter()
            .map(|point| ScoredExchange {
                exchange: point.exchange.clone(),
                score: cosine_similarity(vector, &point.vector),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn scan_session(
        &self,
        collection: &str,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Exchange>, StoreError> {
        let entry = self
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionMissing(collection.to_string()))?;

        let exchanges = entry
            .points
            .iter()
            .filter(|point| point.exchange.session_id == session_id)
            .take(limit)
            .map(|point| point.exchange.clone())
            .collect();
        Ok(exchanges)
    }
}
