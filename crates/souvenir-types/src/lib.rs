//! Shared domain types for Souvenir.
//!
//! This crate contains the core domain types used across the Souvenir memory
//! service: Exchange, scored search results, configuration, and their
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod exchange;
