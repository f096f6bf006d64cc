use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingestion::{export, extract, ingest_jobs, ingest_resume, ResumeIngestSummary};
use crate::models::job::IngestConfirmation;
use crate::state::AppState;

const DEFAULT_USER_ID: &str = "default_user";

#[derive(Debug, Serialize)]
pub struct VacancyUploadResponse {
    pub session_tag: String,
    pub ingested: usize,
    pub confirmations: Vec<IngestConfirmation>,
}

/// POST /api/v1/resume
/// Multipart upload: `file` (PDF resume), optional `user_id` text field.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeIngestSummary>, AppError> {
    let mut user_id = DEFAULT_USER_ID.to_string();
    let mut pdf_bytes: Option<bytes::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart request: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("user_id") => {
                user_id = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid user_id field: {e}")))?;
            }
            Some("file") => {
                pdf_bytes = Some(field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("failed to read uploaded file: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let bytes =
        pdf_bytes.ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?;
    let text = extract::extract_resume_text(&bytes)?;

    let summary =
        ingest_resume(state.embedder.as_ref(), state.store.as_ref(), &user_id, &text).await?;
    Ok(Json(summary))
}

/// POST /api/v1/vacancies
/// Multipart upload: `file` (export JSON). A fresh session tag is minted
/// per upload so this batch can be matched and purged in isolation.
pub async fn handle_upload_vacancies(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VacancyUploadResponse>, AppError> {
    let mut export_bytes: Option<bytes::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart request: {e}")))?
    {
        let name = field.name().map(str::to_string);
        if name.as_deref() == Some("file") {
            export_bytes = Some(field.bytes().await.map_err(|e| {
                AppError::Validation(format!("failed to read uploaded file: {e}"))
            })?);
        }
    }

    let bytes =
        export_bytes.ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?;
    let jobs = export::parse_export(&bytes)?;
    if jobs.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "export contains no job postings".to_string(),
        ));
    }

    let session_tag = Uuid::new_v4().to_string();
    let progress =
        |processed: usize, total: usize| info!("processed {processed}/{total} job postings");

    let confirmations = ingest_jobs(
        state.embedder.as_ref(),
        state.store.as_ref(),
        jobs,
        &session_tag,
        state.config.ingest_chunk_size,
        Some(&progress),
    )
    .await?;

    Ok(Json(VacancyUploadResponse {
        session_tag,
        ingested: confirmations.len(),
        confirmations,
    }))
}
