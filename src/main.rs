use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wardrobe_api::{
    api::{create_router, AppState},
    config::Config,
    db::{self, Cache, CacheWriterHandle, InMemoryStore, PgStore, WardrobeStore},
    services::{
        providers::PerplexityProvider, Authenticator, HashParams, SuggestionPlanner, TokenSigner,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wardrobe_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn WardrobeStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Using PostgreSQL store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, items are kept in memory");
            Arc::new(InMemoryStore::new())
        }
    };

    let (cache, cache_handle): (Option<Cache>, Option<CacheWriterHandle>) =
        match &config.redis_url {
            Some(url) => {
                let client = db::create_redis_client(url)?;
                let (cache, handle) = Cache::new(client).await;
                tracing::info!("Redis cache enabled");
                (Some(cache), Some(handle))
            }
            None => (None, None),
        };

    let planner = match &config.perplexity_api_key {
        Some(api_key) => {
            let provider = PerplexityProvider::new(
                api_key.clone(),
                config.perplexity_api_url.clone(),
                config.perplexity_model.clone(),
                cache,
            );
            tracing::info!(model = %config.perplexity_model, "AI suggestions enabled");
            SuggestionPlanner::new(Some(Arc::new(provider)))
        }
        None => SuggestionPlanner::rule_based(),
    };

    let tokens = match &config.jwt_secret {
        Some(secret) => TokenSigner::new(secret, config.jwt_ttl_secs),
        None => {
            tracing::warn!("JWT_SECRET not set, tokens will not survive a restart");
            TokenSigner::random(config.jwt_ttl_secs)
        }
    };
    let auth = Authenticator::new(tokens, HashParams::default());

    let state = AppState::with_store(store)
        .with_planner(planner)
        .with_auth(auth);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
