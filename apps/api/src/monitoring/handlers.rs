use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::monitoring::{dashboard_summary, log_feedback, DashboardSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub user_id: String,
    pub job_id: String,
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub status: &'static str,
}

/// POST /api/v1/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    log_feedback(&state.db, &req.user_id, &req.job_id, req.liked).await?;
    Ok(Json(FeedbackResponse { status: "recorded" }))
}

/// GET /api/v1/dashboard/summary
pub async fn handle_dashboard_summary(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = dashboard_summary(&state.db).await?;
    Ok(Json(summary))
}
