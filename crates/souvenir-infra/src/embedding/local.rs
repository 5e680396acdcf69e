//! Fastembed-based local embedding generator.
//!
//! Implements the `Embedder` trait from `souvenir-core` using fastembed's
//! AllMiniLM-L6-v2 model (384 dimensions) with ONNX runtime inference.
//! No network access is needed after the model files are cached.

use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use souvenir_core::memory::embedder::Embedder;
use souvenir_types::error::EmbedError;

/// Model identifier reported in logs and startup output.
pub const MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Vector length AllMiniLM-L6-v2 produces.
pub const MODEL_DIMENSION: usize = 384;

/// Embedder running ONNX inference in-process.
///
/// fastembed's `embed` takes `&mut self`, so the model sits behind a mutex
/// and inference runs on tokio's blocking thread pool.
pub struct FastembedEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl FastembedEmbedder {
    /// Load the model, downloading it into the local cache on first use.
    pub fn new() -> Result<Self, EmbedError> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .map_err(|e| EmbedError::ModelUnavailable(format!("{e}")))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

impl Embedder for FastembedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let model = Arc::clone(&self.model);
        let text = text.to_string();

        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model.lock().map_err(|_| {
                EmbedError::ModelUnavailable("embedding model mutex poisoned".to_string())
            })?;
            model
                .embed(vec![text], None)
                .map_err(|e| EmbedError::Request(format!("{e}")))
        })
        .await
        .map_err(|e| EmbedError::Request(format!("embedding task failed: {e}")))??;

        let vector = vectors
            .into_iter()
            .next()
            .ok_or(EmbedError::EmptyResponse)?;

        if vector.len() != MODEL_DIMENSION {
            return Err(EmbedError::WrongDimension {
                expected: MODEL_DIMENSION,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimension(&self) -> usize {
        MODEL_DIMENSION
    }
}
