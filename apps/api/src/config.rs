use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gcp_project_id: String,
    pub gcp_location: String,
    pub gcp_access_token: String,
    /// Embedding model published under the Vertex AI `google` publisher.
    pub embedding_model: String,
    /// Fixed output dimension of `embedding_model`. Must match the vector
    /// column width in the database schema.
    pub embedding_dim: usize,
    pub generation_model: String,
    /// Provider ceiling on texts per embedding request.
    pub embed_max_batch: usize,
    /// Jobs embedded and persisted per ingestion chunk.
    pub ingest_chunk_size: usize,
    /// Store ceiling on writes per transaction.
    pub store_sub_batch_cap: usize,
    pub embed_retry_attempts: u32,
    pub embed_retry_base_ms: u64,
    pub store_retry_attempts: u32,
    pub store_retry_base_ms: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gcp_project_id: require_env("GCP_PROJECT_ID")?,
            gcp_location: env_or("GCP_LOCATION", "us-central1"),
            gcp_access_token: require_env("GCP_ACCESS_TOKEN")?,
            embedding_model: env_or("EMBEDDING_MODEL", "text-embedding-005"),
            embedding_dim: parse_env("EMBEDDING_DIM", 768)?,
            generation_model: env_or("GENERATION_MODEL", "gemini-2.5-flash"),
            embed_max_batch: parse_env("EMBED_MAX_BATCH", 250)?,
            ingest_chunk_size: parse_env("INGEST_CHUNK_SIZE", 30)?,
            store_sub_batch_cap: parse_env("STORE_SUB_BATCH_CAP", 500)?,
            embed_retry_attempts: parse_env("EMBED_RETRY_ATTEMPTS", 5)?,
            embed_retry_base_ms: parse_env("EMBED_RETRY_BASE_MS", 2000)?,
            store_retry_attempts: parse_env("STORE_RETRY_ATTEMPTS", 3)?,
            store_retry_base_ms: parse_env("STORE_RETRY_BASE_MS", 1000)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
