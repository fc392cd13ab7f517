//! Todo API server entry point.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use todo_api::{api, Config, SharedStore, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store = if config.uses_in_memory_database() {
        tracing::warn!("Using an in-memory database; data is lost on exit");
        SqliteStore::open_in_memory()
    } else {
        SqliteStore::open(&config.database_path)
    }
    .with_context(|| {
        format!(
            "could not open database {}",
            config.database_path.display()
        )
    })?;

    let store: SharedStore = Arc::new(store);
    api::serve(config, store).await
}
