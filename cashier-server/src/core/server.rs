//! Server Implementation
//!
//! HTTP 服务器启动和管理

use crate::api;
use crate::core::{Config, ServerState};

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

    /// Create server with existing state (for sharing with tests)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        state.start_background_tasks();

        let app = api::build_app(state.clone());

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Cashier server listening on {}", addr);

        let shutdown_state = state.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
                shutdown_state.shutdown_background_tasks();
            })
            .await?;

        Ok(())
    }
}
