pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ingestion;
use crate::matching;
use crate::monitoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ingestion
        .route(
            "/api/v1/resume",
            post(ingestion::handlers::handle_upload_resume),
        )
        .route(
            "/api/v1/vacancies",
            post(ingestion::handlers::handle_upload_vacancies),
        )
        // Matching
        .route("/api/v1/match", post(matching::handlers::handle_match))
        // Feedback + dashboard
        .route(
            "/api/v1/feedback",
            post(monitoring::handlers::handle_feedback),
        )
        .route(
            "/api/v1/dashboard/summary",
            get(monitoring::handlers::handle_dashboard_summary),
        )
        .with_state(state)
}
