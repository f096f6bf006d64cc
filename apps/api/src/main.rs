mod config;
mod db;
mod errors;
mod ingestion;
mod matching;
mod models;
mod monitoring;
mod providers;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::providers::gemini::GeminiReasoner;
use crate::providers::vertex::VertexEmbedder;
use crate::providers::{Embedder, Reasoner};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgVectorStore;
use crate::store::VectorStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations, including the vector schema)
    let db = create_pool(&config.database_url).await?;

    // Initialize the vector store
    let store: Arc<dyn VectorStore> = Arc::new(PgVectorStore::new(db.clone(), &config));
    info!(
        "Vector store initialized ({}-dimension vectors)",
        config.embedding_dim
    );

    // Initialize provider adapters
    let embedder: Arc<dyn Embedder> = Arc::new(VertexEmbedder::new(&config));
    info!(
        "Embedding client initialized (model: {}, {} dims)",
        config.embedding_model,
        embedder.dimension()
    );

    let reasoner: Arc<dyn Reasoner> = Arc::new(GeminiReasoner::new(&config));
    info!(
        "Reasoning client initialized (model: {})",
        config.generation_model
    );

    // Build app state
    let state = AppState {
        db,
        store,
        embedder,
        reasoner,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
