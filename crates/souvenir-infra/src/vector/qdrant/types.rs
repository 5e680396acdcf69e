//! Wire types for the Qdrant REST API.
//!
//! Only the handful of endpoints the memory service touches are modeled:
//! collection lookup/creation, point upsert, vector search, and payload
//! scroll. Structs mirror Qdrant's JSON shapes; unknown response fields
//! are ignored.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use souvenir_types::exchange::Exchange;

/// Point payload stored alongside each exchange vector.
///
/// `combined_text` duplicates the text that was embedded, so a payload read
/// shows exactly what a hit was ranked on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangePayload {
    pub user_message: String,
    pub ai_response: String,
    pub model_used: String,
    pub session_id: String,
    /// Collections written by other tools may store this without a UTC
    /// offset; offset-less values are read as UTC. Writes always carry one.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub combined_text: String,
}

impl From<&Exchange> for ExchangePayload {
    fn from(exchange: &Exchange) -> Self {
        Self {
            user_message: exchange.user_message.clone(),
            ai_response: exchange.ai_response.clone(),
            model_used: exchange.model_used.clone(),
            session_id: exchange.session_id.clone(),
            timestamp: exchange.timestamp,
            combined_text: exchange.combined_text(),
        }
    }
}

impl ExchangePayload {
    /// Rebuild the domain exchange from a stored payload and its point id.
    pub fn into_exchange(self, id: Uuid) -> Exchange {
        Exchange {
            id,
            user_message: self.user_message,
            ai_response: self.ai_response,
            model_used: self.model_used,
            session_id: self.session_id,
            timestamp: self.timestamp,
        }
    }
}

/// RFC 3339 first, then the offset-less form assumed UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(with_offset.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// A Qdrant point identifier.
///
/// Qdrant accepts unsigned integers or UUID strings. This service writes
/// UUIDs; numeric ids can appear in collections written by other tools and
/// map deterministically into the UUID space.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Uuid(Uuid),
    Num(u64),
}

impl PointId {
    pub fn into_uuid(self) -> Uuid {
        match self {
            PointId::Uuid(id) => id,
            PointId::Num(n) => Uuid::from_u128(n as u128),
        }
    }
}

/// `PUT /collections/{name}` body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCollectionRequest {
    pub vectors: VectorParams,
}

impl CreateCollectionRequest {
    /// Cosine-distance collection of the given dimension.
    pub fn cosine(size: usize) -> Self {
        Self {
            vectors: VectorParams {
                size,
                distance: "Cosine".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorParams {
    pub size: usize,
    pub distance: String,
}

/// `PUT /collections/{name}/points` body.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertPointsRequest {
    pub points: Vec<PointStruct>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointStruct {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: ExchangePayload,
}

/// `POST /collections/{name}/points/search` body.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub vector: Vec<f32>,
    pub limit: usize,
    pub with_payload: bool,
}

/// `POST /collections/{name}/points/scroll` body.
#[derive(Debug, Clone, Serialize)]
pub struct ScrollRequest {
    pub filter: Filter,
    pub limit: usize,
    pub with_payload: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Filter {
    pub must: Vec<Condition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Condition {
    pub key: String,
    #[serde(rename = "match")]
    pub match_value: MatchValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchValue {
    pub value: String,
}

/// Envelope for `GET /collections/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInfoResponse {
    pub result: CollectionInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInfo {
    pub config: CollectionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    pub params: CollectionParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionParams {
    pub vectors: VectorParamsInfo,
}

/// Vector settings of an existing collection. Only the size is read.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorParamsInfo {
    pub size: usize,
}

/// Envelope for `POST .../points/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub result: Vec<ScoredPoint>,
}

/// One search hit.
///
/// The payload stays raw JSON so a single malformed point can be skipped
/// without failing the whole response.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredPoint {
    pub id: PointId,
    pub score: f32,
    pub payload: Option<serde_json::Value>,
}

/// Envelope for `POST .../points/scroll`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrollResponse {
    pub result: ScrollResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrollResult {
    pub points: Vec<ScrolledPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrolledPoint {
    pub id: PointId,
    pub payload: Option<serde_json::Value>,
}
