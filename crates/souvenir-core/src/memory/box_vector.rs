//! BoxVectorStore -- object-safe dynamic dispatch wrapper for VectorStore.
//!
//! Follows the same blanket-impl pattern as BoxEmbedder:
//! 1. Define an object-safe `VectorStoreDyn` trait with boxed futures
//! 2. Blanket-impl `VectorStoreDyn` for all `T: VectorStore`
//! 3. `BoxVectorStore` wraps `Box<dyn VectorStoreDyn>` and implements `VectorStore`

use std::future::Future;
use std::pin::Pin;

use souvenir_types::error::StoreError;
use souvenir_types::exchange::{Exchange, ScoredExchange};

use super::vector::VectorStore;

/// Object-safe version of [`VectorStore`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn VectorStoreDyn`).
/// A blanket implementation is provided for all types implementing `VectorStore`.
pub trait VectorStoreDyn: Send + Sync {
    fn ensure_collection_boxed<'a>(
        &'a self,
        collection: &'a str,
        dimension: usize,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;

    fn upsert_boxed<'a>(
        &'a self,
        collection: &'a str,
        exchange: &'a Exchange,
        vector: &'a [f32],
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;

    fn search_boxed<'a>(
        &'a self,
        collection: &'a str,
        vector: &'a [f32],
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ScoredExchange>, StoreError>> + Send + 'a>>;

    fn scan_session_boxed<'a>(
        &'a self,
        collection: &'a str,
        session_id: &'a str,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Exchange>, StoreError>> + Send + 'a>>;
}

/// Blanket implementation: any `VectorStore` automatically implements `VectorStoreDyn`.
impl<T: VectorStore> VectorStoreDyn for T {
    fn ensure_collection_boxed<'a>(
        &'a self,
        collection: &'a str,
        dimension: usize,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(self.ensure_collection(collection, dimension))
    }

    fn upsert_boxed<'a>(
        &'a self,
        collection: &'a str,
        exchange: &'a Exchange,
        vector: &'a [f32],
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(self.upsert(collection, exchange, vector))
    }

    fn search_boxed<'a>(
        &'a self,
        collection: &'a str,
        vector: &'a [f32],
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ScoredExchange>, StoreError>> + Send + 'a>> {
        Box::pin(self.search(collection, vector, limit))
    }

    fn scan_session_boxed<'a>(
        &'a self,
        collection: &'a str,
        session_id: &'a str,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Exchange>, StoreError>> + Send + 'a>> {
        Box::pin(self.scan_session(collection, session_id, limit))
    }
}

/// Type-erased vector store for runtime backend selection.
///
/// Wraps any `VectorStore` implementation behind dynamic dispatch, enabling
/// the store backend (e.g., Qdrant vs. in-memory) to be chosen from
/// configuration at startup.
///
/// Since `VectorStore` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxVectorStore` implements `VectorStore` itself by delegating
/// to the inner `VectorStoreDyn` trait object, so it slots into anything
/// generic over `VectorStore`.
pub struct BoxVectorStore {
    inner: Box<dyn VectorStoreDyn + Send + Sync>,
}

impl BoxVectorStore {
    /// Wrap a concrete `VectorStore` in a type-erased box.
    pub fn new<T: VectorStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }
}

impl VectorStore for BoxVectorStore {
    async fn ensure_collection(&self, collection: &str, dimension: usize) -> Result<(), StoreError> {
        self.inner.ensure_collection_boxed(collection, dimension).await
    }

    async fn upsert(
        &self,
        collection: &str,
        exchange: &Exchange,
        vector: &[f32],
    ) -> Result<(), StoreError> {
        self.inner.upsert_boxed(collection, exchange, vector).await
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredExchange>, StoreError> {
        self.inner.search_boxed(collection, vector, limit).await
    }

    async fn scan_session(
        &self,
        collection: &str,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Exchange>, StoreError> {
        self.inner.scan_session_boxed(collection, session_id, limit).await
    }
}
