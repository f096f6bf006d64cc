use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::matching::{find_top_matches, purge_session, MatchParams};
use crate::models::matching::{MatchResult, MatchSession};
use crate::monitoring;
use crate::state::AppState;

fn default_top_k() -> usize {
    3
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub user_id: String,
    /// Tag returned by the vacancy upload; limits the search to that
    /// upload's postings.
    pub session_tag: Option<String>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Custom reasoning instruction; the default asks for lacking and
    /// matching skills.
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub matches: Vec<MatchResult>,
}

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let resume = state
        .store
        .get_resume(&req.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no resume stored for user '{}'", req.user_id)))?;

    let session = MatchSession {
        user_id: req.user_id.clone(),
        session_tag: req.session_tag.clone(),
    };
    let params = MatchParams {
        top_k: req.top_k,
        prompt_template: req.prompt.clone(),
    };
    let progress = |message: &str, fraction: f32| {
        info!("match progress {:>3.0}%: {message}", fraction * 100.0);
    };

    let matches = find_top_matches(
        state.embedder.as_ref(),
        state.store.as_ref(),
        state.reasoner.as_ref(),
        &session,
        &resume.text,
        &params,
        Some(&progress),
    )
    .await?;

    if !matches.is_empty() {
        let avg_distance =
            matches.iter().map(|m| m.distance).sum::<f64>() / matches.len() as f64;
        monitoring::log_query(&state.db, &req.user_id, matches.len(), avg_distance).await;

        // Repeated rounds must not accumulate storage or leak stale
        // postings into future scoped queries.
        if let Some(tag) = session.session_tag.as_deref() {
            purge_session(state.store.as_ref(), tag).await;
        }
    }

    Ok(Json(MatchResponse { matches }))
}
