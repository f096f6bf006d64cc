//! PostgreSQL + pgvector backend for the vector store.
//!
//! Vacancy embeddings live in a `vector(D)` column; nearest-neighbor
//! queries use the cosine distance operator `<=>`. Sub-batches commit in
//! one transaction each and are retried on transactional contention.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pgvector::Vector;
use sqlx::PgPool;
use tracing::debug;

use crate::config::Config;
use crate::models::resume::ResumeRecord;
use crate::providers::retry::{retry_with_policy, RetryError, RetryPolicy};
use crate::store::{NearestVacancy, StoreError, VacancyInsert, VectorStore};

pub struct PgVectorStore {
    pool: PgPool,
    dimension: usize,
    sub_batch_cap: usize,
    retry: RetryPolicy,
}

impl PgVectorStore {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            dimension: config.embedding_dim,
            sub_batch_cap: config.store_sub_batch_cap.max(1),
            retry: RetryPolicy::new(
                config.store_retry_attempts,
                Duration::from_millis(config.store_retry_base_ms),
            ),
        }
    }

    /// Commits one sub-batch atomically.
    async fn commit_sub_batch(&self, records: &[VacancyInsert]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for rec in records {
            sqlx::query(
                "INSERT INTO vacancies (job_id, description, posted_at, embedding, session_tag, ingested_at)
                 VALUES ($1, $2, $3, $4, $5, now())
                 ON CONFLICT (job_id) DO UPDATE SET
                     description = EXCLUDED.description,
                     posted_at   = EXCLUDED.posted_at,
                     embedding   = EXCLUDED.embedding,
                     session_tag = EXCLUDED.session_tag,
                     ingested_at = EXCLUDED.ingested_at",
            )
            .bind(&rec.job_id)
            .bind(&rec.description)
            .bind(rec.date)
            .bind(Vector::from(rec.embedding.clone()))
            .bind(&rec.session_tag)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    fn check_dimension(&self, actual: usize) -> Result<(), StoreError> {
        if actual != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }
        Ok(())
    }
}

/// Postgres signals transactional contention with SQLSTATE 40001
/// (serialization_failure) or 40P01 (deadlock_detected).
fn is_transient_contention(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.code().as_deref(), Some("40001") | Some("40P01"))
        }
        _ => false,
    }
}

#[derive(sqlx::FromRow)]
struct NearestRow {
    job_id: String,
    description: String,
    distance: f64,
}

#[derive(sqlx::FromRow)]
struct ResumeRow {
    user_id: String,
    resume_text: String,
    embedding: Vector,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn upsert_batch(&self, records: &[VacancyInsert]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        for rec in records {
            self.check_dimension(rec.embedding.len())?;
        }

        let total = records.len();
        let mut committed = 0usize;

        for sub in records.chunks(self.sub_batch_cap) {
            let result = retry_with_policy(&self.retry, is_transient_contention, || {
                self.commit_sub_batch(sub)
            })
            .await;

            match result {
                Ok(()) => {
                    committed += sub.len();
                    debug!("committed sub-batch, {committed}/{total} records confirmed");
                }
                Err(e) => {
                    let source = match e {
                        RetryError::Permanent(inner) => StoreError::Database(inner),
                        RetryError::Exhausted { attempts, last } => {
                            StoreError::ContentionExhausted {
                                attempts,
                                source: last,
                            }
                        }
                    };
                    // Earlier sub-batches are already durable; report them.
                    return Err(if committed == 0 {
                        source
                    } else {
                        StoreError::PartialBatch {
                            committed,
                            total,
                            source: Box::new(source),
                        }
                    });
                }
            }
        }

        Ok(())
    }

    async fn find_nearest(
        &self,
        query: &[f32],
        k: usize,
        session_tag: Option<&str>,
    ) -> Result<Vec<NearestVacancy>, StoreError> {
        self.check_dimension(query.len())?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, NearestRow>(
            "SELECT job_id, description, (embedding <=> $1)::float8 AS distance
             FROM vacancies
             WHERE $2::text IS NULL OR session_tag = $2
             ORDER BY embedding <=> $1
             LIMIT $3",
        )
        .bind(Vector::from(query.to_vec()))
        .bind(session_tag)
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| NearestVacancy {
                job_id: r.job_id,
                description: r.description,
                distance: r.distance,
            })
            .collect())
    }

    async fn delete_by_scope(&self, session_tag: &str) -> Result<u64, StoreError> {
        let mut deleted = 0u64;

        loop {
            let result = sqlx::query(
                "DELETE FROM vacancies WHERE job_id IN (
                     SELECT job_id FROM vacancies WHERE session_tag = $1 LIMIT $2)",
            )
            .bind(session_tag)
            .bind(self.sub_batch_cap as i64)
            .execute(&self.pool)
            .await?;

            let n = result.rows_affected();
            deleted += n;
            if n == 0 {
                break;
            }
        }

        debug!("deleted {deleted} vacancies for session {session_tag}");
        Ok(deleted)
    }

    async fn put_resume(&self, resume: &ResumeRecord) -> Result<(), StoreError> {
        self.check_dimension(resume.embedding.len())?;

        sqlx::query(
            "INSERT INTO resumes (user_id, resume_text, embedding, updated_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id) DO UPDATE SET
                 resume_text = EXCLUDED.resume_text,
                 embedding   = EXCLUDED.embedding,
                 updated_at  = EXCLUDED.updated_at",
        )
        .bind(&resume.user_id)
        .bind(&resume.text)
        .bind(Vector::from(resume.embedding.clone()))
        .bind(resume.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_resume(&self, user_id: &str) -> Result<Option<ResumeRecord>, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            "SELECT user_id, resume_text, embedding, updated_at
             FROM resumes WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ResumeRecord {
            user_id: r.user_id,
            text: r.resume_text,
            embedding: r.embedding.to_vec(),
            updated_at: r.updated_at,
        }))
    }
}
