//! Capability HTTP server
//!
//! One listener for every capability. Fixed routes (health, optional session
//! routes) are matched first; everything else falls through to the registry.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use super::routes::{dispatch_caps, issue_caps, revoke_caps, security_headers};
use crate::caps::AssetCaps;
use crate::config::AppConfig;
use crate::core::{CapsError, Result};

/// Shared state for the route handlers
#[derive(Clone)]
pub struct ServerState {
    pub caps: Arc<AssetCaps>,
}

/// HTTP front end for the capability registry
pub struct CapsServer {
    config: AppConfig,
    state: ServerState,
}

impl CapsServer {
    pub fn new(config: AppConfig, caps: Arc<AssetCaps>) -> Self {
        Self {
            config,
            state: ServerState { caps },
        }
    }

    /// Address the server binds to
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.config.server.bind_address, self.config.server.port)
    }

    pub fn caps(&self) -> &Arc<AssetCaps> {
        &self.state.caps
    }

    /// Build the router with all routes and middleware
    pub fn build_router(&self) -> Router {
        let mut router = Router::new().route("/health", get(|| async { "OK" }));

        if self.config.server.session_routes {
            router = router.route("/agents/:agent_id/caps", post(issue_caps).delete(revoke_caps));
        }

        router
            .fallback(dispatch_caps)
            .layer(middleware::from_fn(security_headers))
            .layer(DefaultBodyLimit::max(self.config.server.max_upload_bytes))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until `shutdown` fires
    pub async fn start(&self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CapsError::BindFailed {
                reason: format!("{}: {}", addr, e),
            })?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` fires
    pub async fn serve(&self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        let local = listener.local_addr()?;
        tracing::info!(
            "Capability server listening on {} (public URI {})",
            local,
            self.state.caps.registry().server_uri()
        );

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| CapsError::Internal(e.to_string()))?;

        tracing::info!("Capability server on {} stopped", local);
        Ok(())
    }

    /// Start the server in a background task
    pub fn start_background(self) -> ServerHandle {
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let task = tokio::spawn(async move { self.start(token).await });
        ServerHandle { shutdown, task }
    }
}

/// Handle to a server running in the background
pub struct ServerHandle {
    shutdown: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl ServerHandle {
    /// Ask the server to stop accepting connections and drain
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Wait for the server task to finish
    pub async fn join(self) -> Result<()> {
        self.task
            .await
            .map_err(|e| CapsError::Internal(format!("server task failed: {}", e)))?
    }
}
