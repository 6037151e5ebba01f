mod assessment;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::catalog::QuestionCatalog;
use crate::assessment::engine::AssessmentEngine;
use crate::assessment::enrichment::{
    EnrichmentClient, HttpRecommendationService, LlmRecommendationService,
    OfflineRecommendationService, RecommendationService,
};
use crate::assessment::persistence::{KeyValueStore, MemoryStore, PersistenceManager, RedisStore};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career Assessment API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;
    let service = build_recommendation_service(&config)?;
    info!("Recommendation backend: {}", service.backend());

    let catalog = QuestionCatalog::standard();
    let engine = AssessmentEngine::new(
        catalog,
        PersistenceManager::new(store, catalog),
        EnrichmentClient::new(service),
    )
    .clear_progress_on_complete(config.clear_progress_on_complete);
    info!("Question catalog loaded ({} questions)", catalog.len());

    let state = AppState {
        engine: Arc::new(engine),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when `REDIS_URL` is set, otherwise a process-local store.
async fn build_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisStore::connect(url).await?;
            info!("Redis store connected");
            Ok(Arc::new(store))
        }
        None => {
            info!("REDIS_URL not set; sessions are kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// HTTP endpoint first, then the LLM, then offline (fallback-only).
fn build_recommendation_service(config: &Config) -> Result<Arc<dyn RecommendationService>> {
    if let Some(url) = &config.recommendation_url {
        let service = HttpRecommendationService::new(url.clone(), config.enrichment_timeout())?
            .with_retries(config.enrichment_max_retries, RETRY_BACKOFF);
        return Ok(Arc::new(service));
    }
    if let Some(key) = &config.anthropic_api_key {
        let mut llm = LlmClient::new(key.clone(), config.enrichment_timeout())?
            .with_retries(config.enrichment_max_retries, RETRY_BACKOFF);
        if let Some(base_url) = &config.anthropic_base_url {
            llm = llm.with_base_url(base_url);
        }
        info!("LLM client initialized (model: {})", llm_client::MODEL);
        return Ok(Arc::new(LlmRecommendationService::new(llm)));
    }
    Ok(Arc::new(OfflineRecommendationService))
}
