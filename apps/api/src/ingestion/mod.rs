// Ingestion pipeline.
// Validates job records, batch-embeds them, and persists vacancies under a
// session tag so one matching round's uploads can be queried and purged in
// isolation. All embedding traffic goes through the provider adapters — no
// direct REST calls here.

pub mod export;
pub mod extract;
pub mod handlers;

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::errors::AppError;
use crate::models::job::{IngestConfirmation, JobRecord};
use crate::models::resume::ResumeRecord;
use crate::providers::{Embedder, ProviderError};
use crate::store::{StoreError, VacancyInsert, VectorStore};

/// Push-style ingestion progress: `(processed, total)` after each chunk.
pub type IngestProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Pause between chunks so sustained uploads stay under provider rate
/// limits. Skipped after the final chunk.
const CHUNK_PACING: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("embedding chunk {chunk} failed: {source}")]
    Embedding {
        chunk: usize,
        #[source]
        source: ProviderError,
    },

    #[error("persisting chunk {chunk} failed ({committed} records already confirmed): {source}")]
    Persistence {
        chunk: usize,
        committed: usize,
        #[source]
        source: StoreError,
    },
}

/// Summary returned after a resume upload.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeIngestSummary {
    pub user_id: String,
    pub text_length: usize,
    pub embedding_dim: usize,
}

/// Drops records whose description is empty after trimming.
/// Invalid records never fail the run; they are simply not ingested.
pub fn validate_jobs(jobs: Vec<JobRecord>) -> Vec<JobRecord> {
    jobs.into_iter()
        .filter(|job| !job.description.trim().is_empty())
        .collect()
}

/// Ingests job records under `session_tag`.
///
/// Valid records are processed in fixed-size chunks: one batched embedding
/// call, then one store upsert per chunk. Chunks already persisted stay
/// durable if a later chunk fails — at-least-once, not atomic-as-a-whole —
/// and the error reports which chunk failed.
pub async fn ingest_jobs(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    jobs: Vec<JobRecord>,
    session_tag: &str,
    chunk_size: usize,
    progress: Option<&IngestProgressFn>,
) -> Result<Vec<IngestConfirmation>, IngestError> {
    let valid = validate_jobs(jobs);
    let total = valid.len();
    let chunk_size = chunk_size.max(1);
    let mut confirmations: Vec<IngestConfirmation> = Vec::with_capacity(total);

    info!("ingesting {total} valid jobs under session {session_tag}");

    for (chunk_idx, chunk) in valid.chunks(chunk_size).enumerate() {
        let descriptions: Vec<String> = chunk.iter().map(|j| j.description.clone()).collect();

        let embeddings = embedder
            .embed_many(&descriptions)
            .await
            .map_err(|source| IngestError::Embedding {
                chunk: chunk_idx,
                source,
            })?;

        let records: Vec<VacancyInsert> = chunk
            .iter()
            .zip(embeddings.iter())
            .map(|(job, embedding)| VacancyInsert {
                job_id: job.job_id.clone(),
                description: job.description.clone(),
                date: job.date,
                embedding: embedding.clone(),
                session_tag: session_tag.to_string(),
            })
            .collect();

        store
            .upsert_batch(&records)
            .await
            .map_err(|source| IngestError::Persistence {
                chunk: chunk_idx,
                committed: confirmations.len()
                    + match &source {
                        StoreError::PartialBatch { committed, .. } => *committed,
                        _ => 0,
                    },
                source,
            })?;

        confirmations.extend(chunk.iter().zip(embeddings.iter()).map(|(job, embedding)| {
            IngestConfirmation {
                job_id: job.job_id.clone(),
                embedding_dim: embedding.len(),
            }
        }));

        if let Some(report) = progress {
            report(confirmations.len(), total);
        }

        if confirmations.len() < total {
            tokio::time::sleep(CHUNK_PACING).await;
        }
    }

    Ok(confirmations)
}

/// Embeds `text` and overwrites the user's single live resume record.
pub async fn ingest_resume(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    user_id: &str,
    text: &str,
) -> Result<ResumeIngestSummary, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("resume text is empty".to_string()));
    }

    let embedding = embedder.embed_one(text).await?;
    let embedding_dim = embedding.len();

    store
        .put_resume(&ResumeRecord {
            user_id: user_id.to_string(),
            text: text.to_string(),
            embedding,
            updated_at: Utc::now(),
        })
        .await?;

    info!("stored resume for user {user_id} ({} chars)", text.len());

    Ok(ResumeIngestSummary {
        user_id: user_id.to_string(),
        text_length: text.len(),
        embedding_dim,
    })
}
