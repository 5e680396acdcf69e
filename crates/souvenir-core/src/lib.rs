//! Memory service logic and collaborator trait definitions for Souvenir.
//!
//! This crate defines the "ports" (the `Embedder` and `VectorStore` traits)
//! that the infrastructure layer implements. It depends only on
//! `souvenir-types` -- never on `souvenir-infra` or any network/IO crate.

pub mod context;
pub mod memory;
