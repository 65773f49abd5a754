//! uian-api - HTTP API server for uian

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use uian_api::{app, AppState};
use uian_core::{defaults, CaseRepository, CaseSearchRepository, EmbeddingBackend, RetrievalConfig};
use uian_db::Database;
use uian_inference::{ClaudeBackend, OpenAiBackend};
use uian_rag::{AnswerGenerator, CaseAdvisor, ContextRetriever, EmbeddingSync};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let db = Database::connect(&database_url).await?;
    db.migrate().await?;

    // Provider clients are constructed once here and injected; a missing
    // embedding key degrades retrieval instead of failing startup, and a
    // missing generation key is reported per request.
    let embedder: Option<Arc<dyn EmbeddingBackend>> = OpenAiBackend::from_env()
        .map(|b| Arc::new(b) as Arc<dyn EmbeddingBackend>);
    if embedder.is_none() {
        warn!("OPENAI_API_KEY not set; similarity retrieval and embedding sync are disabled");
    }
    let generation = Arc::new(ClaudeBackend::from_env()?);

    let cases: Arc<dyn CaseRepository> = Arc::new(db.cases.clone());
    let search: Arc<dyn CaseSearchRepository> = Arc::new(db.search.clone());

    let retriever = ContextRetriever::new(embedder.clone(), search, RetrievalConfig::from_env());
    let advisor = Arc::new(CaseAdvisor::new(retriever, AnswerGenerator::new(generation)));
    let sync = Arc::new(EmbeddingSync::new(cases.clone(), embedder));

    let state = AppState {
        cases,
        advisor,
        sync,
    };

    let router = app(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(defaults::SERVER_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
