//! Vertex AI text-embedding adapter.
//!
//! Wraps the `:predict` REST endpoint of a publisher embedding model
//! (default `text-embedding-005`, 768 dimensions). Batch requests are split
//! to the provider ceiling and each batch is retried on quota signals with
//! exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::providers::retry::{retry_with_policy, RetryError, RetryPolicy};
use crate::providers::{classify_api_error, Embedder, ProviderError};

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    embeddings: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Embedding client for the Vertex AI `:predict` endpoint.
pub struct VertexEmbedder {
    client: Client,
    endpoint: String,
    access_token: String,
    dimension: usize,
    max_batch: usize,
    retry: RetryPolicy,
}

impl VertexEmbedder {
    pub fn new(config: &Config) -> Self {
        let endpoint = format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{proj}/locations/{loc}/publishers/google/models/{model}:predict",
            loc = config.gcp_location,
            proj = config.gcp_project_id,
            model = config.embedding_model,
        );

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
            access_token: config.gcp_access_token.clone(),
            dimension: config.embedding_dim,
            max_batch: config.embed_max_batch,
            retry: RetryPolicy::new(
                config.embed_retry_attempts,
                Duration::from_millis(config.embed_retry_base_ms),
            ),
        }
    }

    /// One provider call for at most `max_batch` texts.
    async fn predict(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let body = PredictRequest {
            instances: texts.iter().map(|t| Instance { content: t }).collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status.as_u16(), &body));
        }

        let parsed: PredictResponse = response.json().await?;
        if parsed.predictions.len() != texts.len() {
            return Err(ProviderError::MalformedResponse(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                parsed.predictions.len()
            )));
        }

        Ok(parsed
            .predictions
            .into_iter()
            .map(|p| p.embeddings.values)
            .collect())
    }
}

#[async_trait]
impl Embedder for VertexEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        let texts = [text.to_string()];
        let mut vectors = self.embed_many(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| ProviderError::MalformedResponse("no embedding returned".to_string()))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all = Vec::with_capacity(texts.len());
        for (start, end) in batch_spans(texts.len(), self.max_batch) {
            let chunk = &texts[start..end];
            let vectors = retry_with_policy(&self.retry, ProviderError::is_transient, || {
                self.predict(chunk)
            })
            .await
            .map_err(|e| match e {
                RetryError::Permanent(inner) => inner,
                RetryError::Exhausted { attempts, last } => ProviderError::EmbeddingExhausted {
                    attempts,
                    last: last.to_string(),
                },
            })?;

            debug!("embedded batch {}..{} of {}", start, end, texts.len());
            all.extend(vectors);
        }

        Ok(all)
    }
}

/// Spans of at most `cap` items covering `0..len`, in input order.
fn batch_spans(len: usize, cap: usize) -> Vec<(usize, usize)> {
    let cap = cap.max(1);
    let mut spans = Vec::new();
    let mut start = 0;
    while start < len {
        let end = usize::min(start + cap, len);
        spans.push((start, end));
        start = end;
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_spans_cover_input_in_order() {
        let spans = batch_spans(7, 3);
        assert_eq!(spans, vec![(0, 3), (3, 6), (6, 7)]);
    }

    #[test]
    fn test_batch_spans_exact_multiple() {
        assert_eq!(batch_spans(6, 3), vec![(0, 3), (3, 6)]);
    }

    #[test]
    fn test_batch_spans_input_smaller_than_cap() {
        assert_eq!(batch_spans(2, 250), vec![(0, 2)]);
    }

    #[test]
    fn test_batch_spans_empty_input() {
        assert!(batch_spans(0, 250).is_empty());
    }

    #[test]
    fn test_batch_spans_never_exceed_cap() {
        for len in 0..40 {
            for cap in 1..10 {
                let spans = batch_spans(len, cap);
                assert!(spans.iter().all(|(s, e)| e - s <= cap));
                let covered: usize = spans.iter().map(|(s, e)| e - s).sum();
                assert_eq!(covered, len);
            }
        }
    }

    #[test]
    fn test_predict_response_parsing() {
        let raw = r#"{
            "predictions": [
                {"embeddings": {"values": [0.1, 0.2, 0.3], "statistics": {"token_count": 6, "truncated": false}}},
                {"embeddings": {"values": [0.4, 0.5, 0.6], "statistics": {"token_count": 4, "truncated": false}}}
            ]
        }"#;
        let parsed: PredictResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.predictions.len(), 2);
        assert_eq!(parsed.predictions[0].embeddings.values, vec![0.1, 0.2, 0.3]);
        assert_eq!(parsed.predictions[1].embeddings.values, vec![0.4, 0.5, 0.6]);
    }
}
