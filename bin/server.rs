//! Ledger server: reads settings from the environment, prepares the configured store and
//! serves common routes plus `/api/v1/entries`.

use ledger_api::{
    app, ensure_database_exists, ensure_schema, seed::seed_entries, AppState, EntryStore, MemoryEntryStore,
    PgEntryStore, Settings, StoreBackend,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const SEED_COUNT: usize = 50;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ledger_api=info,ledger_server=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let store: Arc<dyn EntryStore> = match (settings.backend, settings.database_url.as_deref()) {
        (StoreBackend::Postgres, Some(database_url)) => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(database_url)
                .await?;
            ensure_schema(&pool).await?;
            tracing::info!("using postgres store");
            Arc::new(PgEntryStore::new(pool))
        }
        _ => {
            tracing::info!("using in-memory store");
            Arc::new(MemoryEntryStore::new())
        }
    };

    if settings.seed {
        seed_entries(store.as_ref(), SEED_COUNT).await?;
    }

    let state = AppState::new(store, settings.limits);
    let router = app(state, settings.body_limit);

    let listener = TcpListener::bind(settings.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
