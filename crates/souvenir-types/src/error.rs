use thiserror::Error;

/// Errors from the embedding backend.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("embedding backend returned no vector")]
    EmptyResponse,

    #[error("embedding has dimension {actual}, expected {expected}")]
    WrongDimension { expected: usize, actual: usize },
}

/// Errors from the vector store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("vector store unreachable: {0}")]
    Connection(String),

    #[error("vector store returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed vector store response: {0}")]
    MalformedResponse(String),

    #[error("collection '{0}' does not exist")]
    CollectionMissing(String),

    #[error(
        "collection '{collection}' holds {actual}-dimensional vectors, \
         but the embedder produces {expected}"
    )]
    DimensionMismatch {
        collection: String,
        expected: usize,
        actual: usize,
    },
}

/// Errors surfaced by memory repository operations.
///
/// These never escape the repository's public operations -- they are logged
/// and converted into the degraded result (false save, empty retrieval).
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedError),

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
}
