//! Cohere embed API client.
//!
//! Implements [`Embedder`] over the `v1/embed` endpoint. Cohere v3 models
//! are asymmetric: `search_document` for indexed texts, `search_query` for
//! user queries.

use crate::config::Config;
use crate::embedding::{Embedder, InputMode};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum number of texts per embed call, per the provider API.
const COHERE_BATCH_LIMIT: usize = 96;

pub struct CohereEmbedder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
    batch_size: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Option<Vec<Vec<f32>>>,
}

impl CohereEmbedder {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::EmbeddingProvider(format!("failed to build client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.embedding_base_url.trim_end_matches('/').to_string(),
            api_key: config.embedding_api_key.clone(),
            model: config.embedding_model.clone(),
            dimension: config.embedding_dimension,
            // The provider rejects larger batches outright, so clamp.
            batch_size: config.embed_batch_size.min(COHERE_BATCH_LIMIT),
        })
    }
}

impl std::fmt::Debug for CohereEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CohereEmbedder")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

#[async_trait::async_trait]
impl Embedder for CohereEmbedder {
    async fn embed(&self, texts: &[String], mode: InputMode) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let input_type = match mode {
            InputMode::Query => "search_query",
            InputMode::Document => "search_document",
        };

        let response = self
            .http
            .post(format!("{}/v1/embed", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbedRequest {
                texts,
                model: &self.model,
                input_type,
            })
            .send()
            .await
            .map_err(|e| AppError::EmbeddingProvider(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::EmbeddingProvider(e.to_string()))?;

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::EmbeddingProvider(format!("malformed embed response: {e}")))?;

        match body.embeddings {
            Some(embeddings) if !embeddings.is_empty() => {
                tracing::debug!(
                    texts = texts.len(),
                    input_type,
                    "Embedded batch via Cohere"
                );
                Ok(embeddings)
            }
            _ => Err(AppError::NoEmbeddings),
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }
}
