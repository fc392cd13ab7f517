//! Router construction and server lifecycle.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use tower_http::trace::TraceLayer;

use super::error::message;
use super::{projects, tasks};
use crate::config::Config;
use crate::store::SharedStore;

/// Shared application state.
pub struct AppState {
    /// Settings the server was started with
    pub config: Config,
    /// Persistence backend used by every handler
    pub store: SharedStore,
}

impl AppState {
    pub fn new(config: Config, store: SharedStore) -> Self {
        Self { config, store }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/:project",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/projects/:project/archive",
            put(projects::archive_project).delete(projects::unarchive_project),
        )
        .route(
            "/projects/:project/tasks",
            get(tasks::list_project_tasks).post(tasks::create_task),
        )
        .route(
            "/projects/:project/tasks/:task",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/projects/:project/tasks/:task/complete",
            put(tasks::complete_task).delete(tasks::reopen_task),
        )
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found() -> impl IntoResponse {
    message(StatusCode::NOT_FOUND, "Route not found")
}

/// Start the HTTP server.
pub async fn serve(config: Config, store: SharedStore) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config, store));
    let addr = state.config.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not listen on {}", addr))?;

    tracing::info!(
        database = %state.config.database_path.display(),
        "Server listening on {}",
        addr
    );

    let app = router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Resolve once SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_serve_binds_the_configured_address() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: taken.local_addr().unwrap().port(),
            ..Config::default()
        };
        let addr = config.bind_addr();

        let err = serve(config, Arc::new(MemoryStore::new()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("could not listen on {}", addr));
    }
}
