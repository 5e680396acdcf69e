//! Infrastructure layer for Souvenir.
//!
//! Contains implementations of the collaborator traits defined in
//! `souvenir-core`: embedding backends (fastembed local model, OpenAI-compatible
//! HTTP API), vector stores (Qdrant REST, in-memory), and configuration loading.

pub mod config;
pub mod embedding;
pub mod vector;
