//! Pinecone vector store adapter.
//!
//! Index resolution is lazy and single-flight: the data-plane host is looked
//! up (creating the index if it does not exist) at most once per process via
//! a `OnceCell`, so concurrent first callers collapse into one control-plane
//! round trip and a failed resolution stays retryable.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::index::{VectorIndex, VectorMatch, VectorRecord};
use crate::ingestion::{ParamMap, ToolCard};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;

pub struct PineconeIndex {
    http: reqwest::Client,
    control_url: String,
    api_key: String,
    index_name: String,
    dimension: usize,
    host: OnceCell<String>,
}

#[derive(Deserialize)]
struct IndexList {
    indexes: Option<Vec<IndexDescription>>,
}

#[derive(Deserialize)]
struct IndexDescription {
    name: String,
    host: String,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Serialize)]
struct UpsertRequest {
    vectors: Vec<PineconeVector>,
}

#[derive(Serialize)]
struct PineconeVector {
    id: String,
    values: Vec<f32>,
    metadata: CardMetadata,
}

/// Flattened card fields as stored in provider metadata. `params` is the
/// JSON-stringified ParamMap; this struct is the only place that encoding
/// exists.
#[derive(Serialize, Deserialize)]
struct CardMetadata {
    name: String,
    description: String,
    method: String,
    path: String,
    params: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    matches: Option<Vec<PineconeMatch>>,
}

#[derive(Deserialize)]
struct PineconeMatch {
    id: String,
    score: Option<f64>,
    metadata: Option<CardMetadata>,
}

impl PineconeIndex {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::IndexUnavailable(format!("failed to build client: {e}")))?;

        Ok(Self {
            http,
            control_url: config.vector_base_url.trim_end_matches('/').to_string(),
            api_key: config.vector_api_key.clone(),
            index_name: config.index_name.clone(),
            dimension: config.embedding_dimension,
            host: OnceCell::new(),
        })
    }

    /// Resolve the data-plane host, creating the index on first use.
    async fn host(&self) -> Result<&String> {
        self.host.get_or_try_init(|| self.resolve_host()).await
    }

    async fn resolve_host(&self) -> Result<String> {
        if let Some(host) = self.find_host().await? {
            tracing::debug!(index = %self.index_name, host = %host, "Vector index already exists");
            return Ok(host);
        }

        tracing::info!(
            index = %self.index_name,
            dimension = self.dimension,
            "Creating vector index"
        );

        let response = self
            .http
            .post(format!("{}/indexes", self.control_url))
            .header("Api-Key", &self.api_key)
            .json(&CreateIndexRequest {
                name: &self.index_name,
                dimension: self.dimension,
                metric: "cosine",
                spec: IndexSpec {
                    serverless: ServerlessSpec {
                        cloud: "aws",
                        region: "us-east-1",
                    },
                },
            })
            .send()
            .await
            .map_err(|e| AppError::IndexUnavailable(e.to_string()))?;

        // Another process may have won a creation race; the index exists
        // either way.
        if response.status() == StatusCode::CONFLICT {
            return self.find_host().await?.ok_or_else(|| {
                AppError::IndexUnavailable("index creation conflicted but index is not listed".into())
            });
        }

        let created: IndexDescription = response
            .error_for_status()
            .map_err(|e| AppError::IndexUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::IndexUnavailable(format!("malformed create response: {e}")))?;

        tracing::info!(index = %created.name, host = %created.host, "Vector index created");
        Ok(created.host)
    }

    async fn find_host(&self) -> Result<Option<String>> {
        let list: IndexList = self
            .http
            .get(format!("{}/indexes", self.control_url))
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::IndexUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::IndexUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::IndexUnavailable(format!("malformed index list: {e}")))?;

        Ok(list
            .indexes
            .unwrap_or_default()
            .into_iter()
            .find(|index| index.name == self.index_name)
            .map(|index| index.host))
    }
}

impl std::fmt::Debug for PineconeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeIndex")
            .field("control_url", &self.control_url)
            .field("index_name", &self.index_name)
            .field("dimension", &self.dimension)
            .finish()
    }
}

#[async_trait::async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let host = self.host().await?;
        let vectors: Vec<PineconeVector> =
            records.into_iter().map(flatten_record).collect::<Result<_>>()?;
        let count = vectors.len();

        self.http
            .post(format!("https://{host}/vectors/upsert"))
            .header("Api-Key", &self.api_key)
            .json(&UpsertRequest { vectors })
            .send()
            .await
            .map_err(|e| AppError::IndexUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::IndexUnavailable(e.to_string()))?;

        tracing::debug!(count, index = %self.index_name, "Upserted tool card vectors");
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>> {
        let host = self.host().await?;

        let response: QueryResponse = self
            .http
            .post(format!("https://{host}/query"))
            .header("Api-Key", &self.api_key)
            .json(&QueryRequest {
                vector,
                top_k,
                include_metadata: true,
            })
            .send()
            .await
            .map_err(|e| AppError::IndexUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::IndexUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::IndexUnavailable(format!("malformed query response: {e}")))?;

        Ok(response
            .matches
            .unwrap_or_default()
            .into_iter()
            .filter_map(restore_match)
            .collect())
    }
}

fn flatten_record(record: VectorRecord) -> Result<PineconeVector> {
    let params = serde_json::to_string(&record.card.params)
        .map_err(|e| AppError::IndexUnavailable(format!("failed to encode params metadata: {e}")))?;

    Ok(PineconeVector {
        id: record.id,
        values: record.values,
        metadata: CardMetadata {
            name: record.card.name,
            description: record.card.description,
            method: record.card.method,
            path: record.card.path,
            params,
        },
    })
}

/// Re-materialize a card from stored metadata. A match with missing or
/// unreadable metadata is dropped with a warning rather than poisoning the
/// whole result set.
fn restore_match(m: PineconeMatch) -> Option<VectorMatch> {
    let Some(metadata) = m.metadata else {
        tracing::warn!(id = %m.id, "Dropping match without metadata");
        return None;
    };

    let params: ParamMap = match serde_json::from_str(&metadata.params) {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!(id = %m.id, error = %e, "Dropping match with unreadable params metadata");
            return None;
        }
    };

    Some(VectorMatch {
        score: m.score.unwrap_or(0.0),
        id: m.id,
        card: ToolCard {
            name: metadata.name,
            description: metadata.description,
            method: metadata.method,
            path: metadata.path,
            params,
        },
    })
}
