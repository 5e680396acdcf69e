//! Service configuration types for Souvenir.
//!
//! `ServiceConfig` represents the top-level `config.toml` that controls the
//! HTTP bind address, the memory collection, and which embedding/vector-store
//! backends the process wires up at startup.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Souvenir memory service.
///
/// Loaded from `~/.souvenir/config.toml`. All fields have sensible defaults;
/// an absent or empty file yields a working local configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            memory: MemoryConfig::default(),
            store: StoreConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// HTTP bind address for the service boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Memory repository settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Vector store collection holding all exchanges.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Recorded as `model_used` when a save request omits it.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Upper bound on a single embedding call.
    #[serde(default = "default_embed_timeout_secs")]
    pub embed_timeout_secs: u64,

    /// Upper bound on a single vector store round trip.
    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,
}

fn default_collection() -> String {
    "openwebui_memory".to_string()
}

fn default_model() -> String {
    "phi3:3.8b".to_string()
}

fn default_embed_timeout_secs() -> u64 {
    30
}

fn default_store_timeout_secs() -> u64 {
    10
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            default_model: default_model(),
            embed_timeout_secs: default_embed_timeout_secs(),
            store_timeout_secs: default_store_timeout_secs(),
        }
    }
}

/// Which vector store backend the process talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Qdrant over its REST API. The production backend.
    Qdrant,
    /// In-process store. Dev and test use; contents vanish on restart.
    Memory,
}

/// Vector store backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,

    /// Base URL of the Qdrant REST API. Ignored by the in-process backend.
    #[serde(default = "default_qdrant_url")]
    pub url: String,
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Qdrant
}

fn default_qdrant_url() -> String {
    "http://localhost:6333".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            url: default_qdrant_url(),
        }
    }
}

/// Which embedding backend produces exchange vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local ONNX inference (AllMiniLM-L6-v2, 384 dimensions). No network.
    Local,
    /// Any OpenAI-compatible `/embeddings` endpoint (OpenAI, Ollama, ...).
    OpenAi,
}

/// Embedding backend selection.
///
/// `model`, `base_url`, `api_key`, and `dimension` only apply to the
/// [`EmbeddingBackend::OpenAi`] backend; the local backend's model and
/// dimensionality are fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_backend")]
    pub backend: EmbeddingBackend,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Prefer the `SOUVENIR_EMBEDDING_API_KEY` environment variable over
    /// writing a key into the config file.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Vector length the remote model produces. Must match any existing
    /// collection or startup fails.
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

fn default_embedding_backend() -> EmbeddingBackend {
    EmbeddingBackend::Local
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_dimension() -> usize {
    1536
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: default_embedding_backend(),
            model: default_embedding_model(),
            base_url: default_embedding_base_url(),
            api_key: None,
            dimension: default_embedding_dimension(),
        }
    }
}
