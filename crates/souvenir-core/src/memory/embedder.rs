//! Embedder trait for text-to-vector conversion.
//!
//! Defines the interface for embedding text into vectors for semantic search.
//! Implementations (e.g., local models, OpenAI-compatible APIs) live in
//! souvenir-infra.

use souvenir_types::error::EmbedError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in souvenir-infra.
pub trait Embedder: Send + Sync {
    /// Embed a single text into a vector.
    ///
    /// The returned vector always has [`dimension`](Embedder::dimension)
    /// elements. Empty input is embedded like any other text, not rejected.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, EmbedError>> + Send;

    /// The model name used for embeddings (e.g., "all-MiniLM-L6-v2").
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors, fixed at construction.
    fn dimension(&self) -> usize;
}
