//! Application state wiring the memory service to concrete backends.
//!
//! The memory service is generic over the `Embedder` and `VectorStore`
//! traits; AppState pins it to box-erased instances selected from
//! configuration at startup.

use std::sync::Arc;

use secrecy::SecretString;

use souvenir_core::memory::box_embedder::BoxEmbedder;
use souvenir_core::memory::box_vector::BoxVectorStore;
use souvenir_core::memory::embedder::Embedder;
use souvenir_core::memory::service::MemoryService;
use souvenir_infra::embedding::local::FastembedEmbedder;
use souvenir_infra::embedding::openai::OpenAiCompatEmbedder;
use souvenir_infra::vector::memory::InMemoryVectorStore;
use souvenir_infra::vector::qdrant::QdrantVectorStore;
use souvenir_types::config::{EmbeddingBackend, ServiceConfig, StoreBackend};
use souvenir_types::error::{MemoryError, StoreError};

/// The memory service pinned to runtime-selected backends.
pub type ConcreteMemoryService = MemoryService<BoxEmbedder, BoxVectorStore>;

/// Shared application state for the REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub memory: Arc<ConcreteMemoryService>,
}

impl AppState {
    /// Wire the configured backends and verify the collection is usable.
    ///
    /// Fails when the embedding model cannot load or when the collection
    /// already exists with a different dimension than the embedder
    /// produces. An unreachable store is not fatal: the bootstrap failure
    /// is logged and the service starts degraded, with per-request
    /// operations reporting failure until the store comes back.
    pub async fn init(config: ServiceConfig) -> anyhow::Result<Self> {
        let embedder = match config.embedding.backend {
            EmbeddingBackend::Local => BoxEmbedder::new(FastembedEmbedder::new()?),
            EmbeddingBackend::OpenAi => {
                // Environment variable wins over a key written into config.toml
                let api_key = std::env::var("SOUVENIR_EMBEDDING_API_KEY")
                    .ok()
                    .or_else(|| config.embedding.api_key.clone())
                    .map(SecretString::from);

                BoxEmbedder::new(OpenAiCompatEmbedder::new(
                    &config.embedding.base_url,
                    config.embedding.model.clone(),
                    api_key,
                    config.embedding.dimension,
                ))
            }
        };

        let store = match config.store.backend {
            StoreBackend::Qdrant => BoxVectorStore::new(QdrantVectorStore::new(&config.store.url)),
            StoreBackend::Memory => BoxVectorStore::new(InMemoryVectorStore::new()),
        };

        tracing::info!(
            model = %embedder.model_name(),
            dimension = embedder.dimension(),
            collection = %config.memory.collection,
            "Memory backends wired"
        );

        let memory = MemoryService::new(embedder, store, &config.memory);
        if let Err(error) = memory.ensure_ready().await {
            if startup_fatal(&error) {
                return Err(error.into());
            }
            tracing::warn!(error = %error, "Vector store not ready at startup, continuing degraded");
        }

        Ok(Self {
            memory: Arc::new(memory),
        })
    }
}

/// Whether an `ensure_ready` failure should abort startup.
///
/// A collection holding vectors of a different dimensionality than the
/// embedder produces cannot be recovered from at runtime. Anything else
/// (store unreachable, transient API errors, timeouts) is the same degraded
/// mode the per-request operations already absorb, so the server starts and
/// saves report failure until the store comes back.
fn startup_fatal(error: &MemoryError) -> bool {
    matches!(
        error,
        MemoryError::Store(StoreError::DimensionMismatch { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_dimension_mismatch_is_startup_fatal() {
        let mismatch = MemoryError::Store(StoreError::DimensionMismatch {
            collection: "openwebui_memory".to_string(),
            expected: 384,
            actual: 1536,
        });
        assert!(startup_fatal(&mismatch));

        let unreachable = MemoryError::Store(StoreError::Connection("refused".to_string()));
        assert!(!startup_fatal(&unreachable));

        let timed_out = MemoryError::Timeout {
            operation: "ensure_collection",
            timeout_ms: 10_000,
        };
        assert!(!startup_fatal(&timed_out));
    }

    #[tokio::test]
    async fn test_init_tolerates_unreachable_store() {
        let mut config = ServiceConfig::default();
        // Remote embedder so construction never touches the network; both
        // backends point at a port nothing listens on.
        config.embedding.backend = EmbeddingBackend::OpenAi;
        config.embedding.base_url = "http://127.0.0.1:1".to_string();
        config.store.backend = StoreBackend::Qdrant;
        config.store.url = "http://127.0.0.1:1".to_string();

        let state = AppState::init(config).await.unwrap();

        // Degraded, not broken: the save reports failure instead of panicking.
        assert!(
            !state
                .memory
                .save_exchange("q".into(), "a".into(), None, None)
                .await
        );
    }
}
