use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::providers::{Embedder, Reasoner};
use crate::store::VectorStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Vacancy/resume persistence and nearest-neighbor search.
    pub store: Arc<dyn VectorStore>,
    pub embedder: Arc<dyn Embedder>,
    pub reasoner: Arc<dyn Reasoner>,
    pub config: Config,
}
