//! Embedding backends for exchange vectors.
//!
//! `local` runs AllMiniLM-L6-v2 in-process through fastembed's ONNX runtime;
//! `openai` calls any OpenAI-compatible `/embeddings` endpoint over HTTP.

pub mod local;
pub mod openai;
