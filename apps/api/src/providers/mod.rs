/// Provider adapters — the single point of entry for all Vertex AI calls.
///
/// ARCHITECTURAL RULE: No other module may call the Vertex AI REST API
/// directly. All embedding and reasoning traffic MUST go through the
/// `Embedder` and `Reasoner` traits defined here.
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub mod gemini;
pub mod prompts;
pub mod retry;
pub mod vertex;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected the request (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited (status {status}): {message}")]
    RateLimited { status: u16, message: String },

    #[error("embedding retries exhausted after {attempts} attempts: {last}")]
    EmbeddingExhausted { attempts: u32, last: String },

    #[error("reasoning generation failed: {0}")]
    ReasoningFailed(String),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("input text is empty")]
    EmptyInput,
}

impl ProviderError {
    /// Transient errors are retried with backoff; everything else surfaces
    /// immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

/// Turns text into fixed-dimension embedding vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Fixed output dimension of the underlying model.
    fn dimension(&self) -> usize;

    /// Embeds a single text. The text must be non-empty after trimming.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Embeds many texts. Output order matches input order and output
    /// length equals input length; provider batch ceilings are handled
    /// internally and are invisible to the caller.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

/// Produces a free-text rationale for how a job posting fits a resume.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Generates the rationale. Uses the default prompt template when
    /// `prompt_template` is `None`.
    async fn explain(
        &self,
        resume_text: &str,
        job_text: &str,
        prompt_template: Option<&str>,
    ) -> Result<String, ProviderError>;
}

/// Standard Google API error envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorBody {
    pub(crate) error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorDetail {
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) status: String,
}

/// Classifies a non-success provider response by HTTP status and the
/// structured `status` field of the error body — never by matching on
/// message text. Quota signals become `RateLimited` (retryable); anything
/// else is `Api` (permanent).
pub(crate) fn classify_api_error(status: u16, body: &str) -> ProviderError {
    let (message, google_status) = match serde_json::from_str::<GoogleErrorBody>(body) {
        Ok(parsed) => (parsed.error.message, parsed.error.status),
        Err(_) => (body.to_string(), String::new()),
    };

    if status == 429 || google_status == "RESOURCE_EXHAUSTED" {
        ProviderError::RateLimited { status, message }
    } else {
        ProviderError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_429_as_rate_limited() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = classify_api_error(429, body);
        assert!(err.is_transient());
        assert!(matches!(err, ProviderError::RateLimited { status: 429, .. }));
    }

    #[test]
    fn test_classify_resource_exhausted_status_without_429() {
        // Some quota failures arrive as 403 with status RESOURCE_EXHAUSTED.
        let body = r#"{"error": {"code": 403, "message": "Quota exceeded for requests", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = classify_api_error(403, body);
        assert!(err.is_transient());
    }

    #[test]
    fn test_classify_bad_request_as_permanent() {
        let body = r#"{"error": {"code": 400, "message": "Invalid model", "status": "INVALID_ARGUMENT"}}"#;
        let err = classify_api_error(400, body);
        assert!(!err.is_transient());
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid model");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_unparseable_body_keeps_raw_text() {
        let err = classify_api_error(500, "upstream connect error");
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream connect error");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
