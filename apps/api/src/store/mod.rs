//! Vector store — persists vacancy embeddings and the per-user resume, and
//! answers exact nearest-neighbor queries by cosine distance.
//!
//! `PgVectorStore` is the production backend. Pipelines depend only on the
//! `VectorStore` trait so tests can substitute a deterministic in-memory
//! implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::resume::ResumeRecord;

pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("dimension mismatch: store holds {expected}-dimension vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("contention retries exhausted after {attempts} attempts: {source}")]
    ContentionExhausted {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("{committed} of {total} records committed before a sub-batch failed: {source}")]
    PartialBatch {
        committed: usize,
        total: usize,
        #[source]
        source: Box<StoreError>,
    },
}

/// A vacancy ready to persist: validated job fields plus its embedding and
/// the session tag isolating this ingestion run.
#[derive(Debug, Clone)]
pub struct VacancyInsert {
    pub job_id: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    pub embedding: Vec<f32>,
    pub session_tag: String,
}

/// One nearest-neighbor result. `distance` is cosine distance
/// (0 = identical direction).
#[derive(Debug, Clone)]
pub struct NearestVacancy {
    pub job_id: String,
    pub description: String,
    pub distance: f64,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upserts vacancies keyed by `job_id` (last write wins). Writes are
    /// committed in sub-batches no larger than the store's transactional
    /// cap; each sub-batch is atomic and stays durable even if a later one
    /// fails, in which case the error reports how many records were
    /// confirmed.
    async fn upsert_batch(&self, records: &[VacancyInsert]) -> Result<(), StoreError>;

    /// Returns at most `k` vacancies ordered by ascending cosine distance
    /// to `query`, optionally restricted to one session tag. A query whose
    /// dimension differs from the stored vectors is an error.
    async fn find_nearest(
        &self,
        query: &[f32],
        k: usize,
        session_tag: Option<&str>,
    ) -> Result<Vec<NearestVacancy>, StoreError>;

    /// Deletes every vacancy under the tag in bounded commit batches.
    /// Zero matches is a no-op returning 0.
    async fn delete_by_scope(&self, session_tag: &str) -> Result<u64, StoreError>;

    /// Overwrites the user's single live resume record.
    async fn put_resume(&self, resume: &ResumeRecord) -> Result<(), StoreError>;

    async fn get_resume(&self, user_id: &str) -> Result<Option<ResumeRecord>, StoreError>;
}
