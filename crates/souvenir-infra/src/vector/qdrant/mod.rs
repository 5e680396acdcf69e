//! QdrantVectorStore -- concrete [`VectorStore`] implementation over the
//! Qdrant REST API.
//!
//! Talks plain HTTP/JSON via `reqwest` rather than the gRPC client, so the
//! only moving part is a base URL. Collections are created with cosine
//! distance and points carry the full exchange as payload. Malformed points
//! encountered on reads are logged and skipped rather than failing the
//! whole operation.

pub mod types;

use std::time::Duration;

use souvenir_core::memory::vector::VectorStore;
use souvenir_types::error::StoreError;
use souvenir_types::exchange::{Exchange, ScoredExchange};

use self::types::{
    CollectionInfoResponse, Condition, CreateCollectionRequest, ExchangePayload, Filter,
    MatchValue, PointId, PointStruct, ScrollRequest, ScrollResponse, SearchRequest,
    SearchResponse, UpsertPointsRequest,
};

/// Vector store backed by a Qdrant instance.
pub struct QdrantVectorStore {
    client: reqwest::Client,
    base_url: String,
}

impl QdrantVectorStore {
    /// Create a store talking to the given Qdrant base URL
    /// (e.g. `http://localhost:6333`).
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30)) // backstop; callers apply per-operation deadlines
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the vector size of an existing collection, or `None` when the
    /// collection does not exist (HTTP 404).
    async fn collection_dimension(&self, collection: &str) -> Result<Option<usize>, StoreError> {
        let url = self.url(&format!("/collections/{collection}"));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Connection(format!("HTTP request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response).await?;
        let info: CollectionInfoResponse = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(format!("collection info: {e}")))?;

        Ok(Some(info.result.config.params.vectors.size))
    }

    async fn create_collection(
        &self,
        collection: &str,
        dimension: usize,
    ) -> Result<(), StoreError> {
        let url = self.url(&format!("/collections/{collection}"));
        self.put_json(&url, &CreateCollectionRequest::cosine(dimension))
            .await?;
        Ok(())
    }

    /// PUT a JSON body and map HTTP failures into [`StoreError`].
    async fn put_json<B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, StoreError> {
        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Connection(format!("HTTP request failed: {e}")))?;
        check_status(response).await
    }

    /// POST a JSON body and map HTTP failures into [`StoreError`].
    async fn post_json<B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, StoreError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Connection(format!("HTTP request failed: {e}")))?;
        check_status(response).await
    }
}

/// Reject non-2xx responses, capturing the body Qdrant returns.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Convert one raw point into an exchange, or `None` (with a warning) when
/// its payload is missing or has an unexpected shape.
fn point_to_exchange(id: PointId, payload: Option<serde_json::Value>) -> Option<Exchange> {
    let id = id.into_uuid();
    let payload = match payload {
        Some(payload) => payload,
        None => {
            tracing::warn!(point_id = %id, "Point has no payload, skipping");
            return None;
        }
    };

    match serde_json::from_value::<ExchangePayload>(payload) {
        Ok(payload) => Some(payload.into_exchange(id)),
        Err(err) => {
            tracing::warn!(point_id = %id, "Malformed point payload, skipping: {err}");
            None
        }
    }
}

impl VectorStore for QdrantVectorStore {
    async fn ensure_collection(
        &self,
        collection: &str,
        dimension: usize,
    ) -> Result<(), StoreError> {
        match self.collection_dimension(collection).await? {
            Some(actual) if actual == dimension => {
                tracing::debug!(collection = %collection, "Collection already exists");
                Ok(())
            }
            Some(actual) => Err(StoreError::DimensionMismatch {
                collection: collection.to_string(),
                expected: dimension,
                actual,
            }),
            None => {
                self.create_collection(collection, dimension).await?;
                tracing::info!(
                    collection = %collection,
                    dimension = dimension,
                    "Created Qdrant collection"
                );
                Ok(())
            }
        }
    }

    async fn upsert(
        &self,
        collection: &str,
        exchange: &Exchange,
        vector: &[f32],
    ) -> Result<(), StoreError> {
        // wait=true makes the write visible to the next search
        let url = self.url(&format!("/collections/{collection}/points?wait=true"));
        let body = UpsertPointsRequest {
            points: vec![PointStruct {
                id: exchange.id,
                vector: vector.to_vec(),
                payload: ExchangePayload::from(exchange),
            }],
        };

        self.put_json(&url, &body).await?;
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredExchange>, StoreError> {
        let url = self.url(&format!("/collections/{collection}/points/search"));
        let body = SearchRequest {
            vector: vector.to_vec(),
            limit,
            with_payload: true,
        };

        let response = self.post_json(&url, &body).await?;
        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(format!("search response: {e}")))?;

        let hits = parsed
            .result
            .into_iter()
            .filter_map(|point| {
                let score = point.score;
                point_to_exchange(point.id, point.payload)
                    .map(|exchange| ScoredExchange { exchange, score })
            })
            .collect();
        Ok(hits)
    }

    async fn scan_session(
        &self,
        collection: &str,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Exchange>, StoreError> {
        let url = self.url(&format!("/collections/{collection}/points/scroll"));
        let body = ScrollRequest {
            filter: Filter {
                must: vec![Condition {
                    key: "session_id".to_string(),
                    match_value: MatchValue {
                        value: session_id.to_string(),
                    },
                }],
            },
            limit,
            with_payload: true,
        };

        let response = self.post_json(&url, &body).await?;
        let parsed: ScrollResponse = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(format!("scroll response: {e}")))?;

        let exchanges = parsed
            .result
            .points
            .into_iter()
            .filter_map(|point| point_to_exchange(point.id, point.payload))
            .collect();
        Ok(exchanges)
    }
}
