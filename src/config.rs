use std::env;
use std::path::PathBuf;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Path to the OpenAPI JSON document the tool cards are extracted from.
    pub spec_path: PathBuf,
    /// Embedding provider (Cohere-compatible) settings.
    pub embedding_api_key: String,
    pub embedding_base_url: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    /// Provider ceiling on texts per embed call.
    pub embed_batch_size: usize,
    /// Embedding batches in flight at once during indexing.
    pub embed_concurrency: usize,
    /// Vector store (Pinecone-compatible) settings.
    pub vector_api_key: String,
    pub vector_base_url: String,
    pub index_name: String,
    /// Timeout applied to every outbound provider call.
    pub request_timeout_secs: u64,
    /// Retrieval defaults.
    pub top_k: usize,
    pub confidence_threshold: f64,
    pub similarity_weight: f64,
    pub structural_weight: f64,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Only the two provider API keys are mandatory; everything else falls
    /// back to the defaults the original deployment ran with.
    pub fn from_env() -> anyhow::Result<Self> {
        let embedding_api_key = env::var("COHERE_API_KEY")
            .map_err(|_| anyhow::anyhow!("COHERE_API_KEY must be set"))?;
        let vector_api_key = env::var("PINECONE_API_KEY")
            .map_err(|_| anyhow::anyhow!("PINECONE_API_KEY must be set"))?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            spec_path: PathBuf::from(
                env::var("SPEC_PATH").unwrap_or_else(|_| "./specs/openapi.json".to_string()),
            ),
            embedding_api_key,
            embedding_base_url: env::var("EMBEDDING_BASE_URL")
                .unwrap_or_else(|_| "https://api.cohere.com".to_string()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "embed-english-v3.0".to_string()),
            embedding_dimension: env::var("EMBEDDING_DIMENSION")
                .unwrap_or_else(|_| "1024".to_string())
                .parse()?,
            embed_batch_size: env::var("EMBED_BATCH_SIZE")
                .unwrap_or_else(|_| "96".to_string())
                .parse()?,
            embed_concurrency: env::var("EMBED_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
            vector_api_key,
            vector_base_url: env::var("PINECONE_BASE_URL")
                .unwrap_or_else(|_| "https://api.pinecone.io".to_string()),
            index_name: env::var("INDEX_NAME").unwrap_or_else(|_| "tool-cards".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            top_k: env::var("TOP_K")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            confidence_threshold: env::var("CONFIDENCE_THRESHOLD")
                .unwrap_or_else(|_| "0.66".to_string())
                .parse()?,
            similarity_weight: env::var("SIMILARITY_WEIGHT")
                .unwrap_or_else(|_| "0.85".to_string())
                .parse()?,
            structural_weight: env::var("STRUCTURAL_WEIGHT")
                .unwrap_or_else(|_| "0.15".to_string())
                .parse()?,
        })
    }
}
