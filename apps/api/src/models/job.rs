use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A job posting as produced by the export parser, before embedding.
///
/// `job_id` is caller-supplied or positionally assigned during parsing.
/// A record whose description is empty after trimming is dropped during
/// validation and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
}

/// Per-vacancy confirmation returned when an ingestion run completes.
#[derive(Debug, Clone, Serialize)]
pub struct IngestConfirmation {
    pub job_id: String,
    pub embedding_dim: usize,
}
