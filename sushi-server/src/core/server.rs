//! Server Implementation
//!
//! HTTP server startup and shutdown

use std::net::SocketAddr;

use crate::core::{Config, ServerState};
use crate::utils::AppError;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Serve until Ctrl-C, then stop the background tasks
    pub async fn run(&self) -> Result<(), AppError> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        crate::services::admin::bootstrap_admin(&state).await?;
        let tasks = state.start_background_tasks();

        let app = crate::routes::build_app(state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!("🍣 SushiEats server listening on {}", addr);

        let shutdown = state.shutdown.clone();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
            shutdown.cancel();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        state.shutdown.cancel();
        for task in tasks {
            let _ = task.await;
        }
        tracing::info!("Server stopped");
        Ok(())
    }
}
