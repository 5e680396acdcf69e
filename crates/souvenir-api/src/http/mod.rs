//! HTTP/REST API layer for Souvenir.
//!
//! Axum-based REST API with CORS and request tracing. The memory routes
//! always respond 200 with a degraded body on downstream failure; backend
//! errors never surface as HTTP errors.

pub mod handlers;
pub mod router;
