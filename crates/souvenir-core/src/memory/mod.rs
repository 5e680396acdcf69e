//! Conversational memory for Souvenir.
//!
//! This module defines the `Embedder` and `VectorStore` traits that the
//! infrastructure layer implements, and the `MemoryService` that coordinates
//! them to persist and retrieve chat exchanges.

pub mod box_embedder;
pub mod box_vector;
pub mod embedder;
pub mod service;
pub mod vector;
