//! OpenAI-compatible embedding backend.
//!
//! A single [`OpenAiCompatEmbedder`] serves OpenAI, Ollama, LM Studio, and
//! any other server exposing an OpenAI-style `/embeddings` endpoint -- the
//! base URL and model name come from configuration.
//!
//! The API key is optional (local servers don't check one) and is wrapped
//! in [`secrecy::SecretString`] so it never appears in logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use souvenir_core::memory::embedder::Embedder;
use souvenir_types::error::EmbedError;

/// `POST {base_url}/embeddings` body.
#[derive(Debug, Clone, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: String,
}

/// Response envelope: `{"data": [{"embedding": [...]}], ...}`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedder calling a remote OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiCompatEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
    dimension: usize,
}

// OpenAiCompatEmbedder intentionally does NOT derive Debug so the API key
// cannot leak through debug formatting.

impl OpenAiCompatEmbedder {
    /// Create an embedder for the given endpoint.
    ///
    /// `dimension` states the vector length the remote model produces;
    /// every response is checked against it.
    pub fn new(
        base_url: &str,
        model: String,
        api_key: Option<SecretString>,
        dimension: usize,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60)) // backstop; callers apply per-operation deadlines
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            dimension,
        }
    }
}

impl Embedder for OpenAiCompatEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingsRequest {
            model: self.model.clone(),
            input: text.to_string(),
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmbedError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(EmbedError::Request(format!("HTTP {status}: {error_body}")));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::Request(format!("failed to parse response: {e}")))?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or(EmbedError::EmptyResponse)?;

        if vector.len() != self.dimension {
            return Err(EmbedError::WrongDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder() -> OpenAiCompatEmbedder {
        OpenAiCompatEmbedder::new(
            "http://localhost:11434/v1/",
            "nomic-embed-text".to_string(),
            None,
            768,
        )
    }

    #[test]
    fn test_embeddings_request_shape() {
        let request = EmbeddingsRequest {
            model: "text-embedding-3-small".to_string(),
            input: "User: hi\nAI: hello".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "text-embedding-3-small");
        assert_eq!(json["input"], "User: hi\nAI: hello");
    }

    #[test]
    fn test_embeddings_response_parses_openai_shape() {
        let raw = r#"{
            "object": "list",
            "data": [
                {"object": "embedding", "index": 0, "embedding": [0.1, 0.2]}
            ],
            "model": "text-embedding-3-small",
            "usage": {"prompt_tokens": 8, "total_tokens": 8}
        }"#;

        let response: EmbeddingsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].embedding, vec![0.1, 0.2]);
    }

    #[test]
    fn test_embeddings_response_empty_data() {
        let response: EmbeddingsResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(response.data.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(embedder().base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_model_name_and_dimension_reported() {
        let embedder = embedder();
        assert_eq!(embedder.model_name(), "nomic-embed-text");
        assert_eq!(embedder.dimension(), 768);
    }
}
