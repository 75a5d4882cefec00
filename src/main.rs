use std::sync::Arc;

use anyhow::Context;
use contact_desk_api::auth::TokenGenerator;
use contact_desk_api::config::{self, StoreKind};
use contact_desk_api::database::{DatabaseManager, MemoryStore, PgStore, Repositories};
use contact_desk_api::services::load_fixture;
use contact_desk_api::{app, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting Contact Desk API in {:?} mode", config.environment);
    if contact_desk_api::is_development!() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("JWT_SECRET not set, signing tokens with the development secret");
    }

    let repos = repositories().await?;
    let tokens = TokenGenerator::from_config().context("JWT_SECRET must be set outside development")?;
    let app = app(AppState::new(repos, tokens));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Contact Desk API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    DatabaseManager::close().await;
    Ok(())
}

async fn repositories() -> anyhow::Result<Repositories> {
    let database = &config::config().database;

    match database.store {
        StoreKind::Postgres => {
            let pool = DatabaseManager::pool().await?;
            Ok(Repositories::from_store(Arc::new(PgStore::new(pool))))
        }
        StoreKind::Memory => {
            let repos = Repositories::from_store(Arc::new(MemoryStore::new()));
            if let Some(path) = &database.fixture_path {
                let yaml = std::fs::read_to_string(path).with_context(|| format!("Failed to read fixture {}", path))?;
                load_fixture(&yaml, &repos).await?;
            }
            tracing::info!("Using in-memory store");
            Ok(repos)
        }
    }
}
