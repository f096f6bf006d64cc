//! Gemini reasoning adapter.
//!
//! Wraps the `:generateContent` REST endpoint of a publisher generative
//! model (default `gemini-2.5-flash`). No retry logic of its own: a
//! provider failure propagates as a reasoning-generation error and the
//! caller decides whether to abort the match round.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::providers::prompts::build_reasoning_prompt;
use crate::providers::{GoogleErrorBody, ProviderError, Reasoner};

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Reasoning client for the Vertex AI `:generateContent` endpoint.
pub struct GeminiReasoner {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl GeminiReasoner {
    pub fn new(config: &Config) -> Self {
        let endpoint = format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{proj}/locations/{loc}/publishers/google/models/{model}:generateContent",
            loc = config.gcp_location,
            proj = config.gcp_project_id,
            model = config.generation_model,
        );

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
            access_token: config.gcp_access_token.clone(),
        }
    }
}

#[async_trait]
impl Reasoner for GeminiReasoner {
    async fn explain(
        &self,
        resume_text: &str,
        job_text: &str,
        prompt_template: Option<&str>,
    ) -> Result<String, ProviderError> {
        let prompt = build_reasoning_prompt(resume_text, job_text, prompt_template);

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: &prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::ReasoningFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(reasoning_failed(status.as_u16(), &body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ReasoningFailed(e.to_string()))?;

        debug!("reasoning call succeeded ({} candidates)", parsed.candidates.len());
        extract_text(parsed)
            .ok_or_else(|| ProviderError::ReasoningFailed("model returned no text".to_string()))
    }
}

/// Builds the propagated error for a non-success generation response,
/// preferring the structured message from the Google error envelope.
fn reasoning_failed(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<GoogleErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());
    ProviderError::ReasoningFailed(format!("status {status}: {message}"))
}

/// Concatenates the text parts of the first candidate, if any.
fn extract_text(response: GenerateResponse) -> Option<String> {
    let candidate = response.candidates.into_iter().next()?;
    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_from_single_candidate() {
        let raw = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Matching skills: Rust."}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_text(parsed).as_deref(), Some("Matching skills: Rust."));
    }

    #[test]
    fn test_extract_text_concatenates_parts() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Lacking: none. "}, {"text": "Matching: SQL."}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            extract_text(parsed).as_deref(),
            Some("Lacking: none. Matching: SQL.")
        );
    }

    #[test]
    fn test_extract_text_no_candidates() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(extract_text(parsed).is_none());
    }

    #[test]
    fn test_reasoning_failed_uses_structured_message() {
        let body = r#"{"error": {"code": 400, "message": "Request payload too large", "status": "INVALID_ARGUMENT"}}"#;
        let err = reasoning_failed(400, body);
        match err {
            ProviderError::ReasoningFailed(msg) => {
                assert!(msg.contains("status 400"));
                assert!(msg.contains("Request payload too large"));
            }
            other => panic!("expected ReasoningFailed, got {other:?}"),
        }
    }
}
