//! Vector store implementations for exchange embeddings.
//!
//! Provides the Qdrant REST backend used in production and an in-process
//! store for development and tests. Both implement the `VectorStore` trait
//! from `souvenir-core` with cosine similarity.

pub mod memory;
pub mod qdrant;
