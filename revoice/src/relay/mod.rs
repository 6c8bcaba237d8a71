//! Front-end relay.
//!
//! A thin HTTP service that browsers talk to. Form submissions are forwarded
//! to the worker's `/process` and log polls to its `/logs`; the relay holds no
//! state of its own.

mod client;
mod routes;

pub use client::RelayClient;
pub use routes::{RelayState, create_router};

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::error::{Error, Result};
use crate::utils::http_client::build_http_client;

/// Relay HTTP server.
pub struct RelayServer {
    config: RelayConfig,
    cancel_token: CancellationToken,
}

impl RelayServer {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn build_router(&self) -> axum::Router {
        let client = RelayClient::new(
            build_http_client(self.config.submit_timeout),
            &self.config.worker_url,
            self.config.log_timeout,
        );

        create_router(RelayState { client })
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until the cancel token fires.
    pub async fn run(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.bind_address, self.config.port)
            .parse()
            .map_err(|e| Error::ApiError(format!("Invalid address: {}", e)))?;

        let router = self.build_router();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(
            worker_url = %self.config.worker_url,
            "Relay listening on http://{}",
            addr
        );

        let cancel_token = self.cancel_token.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                tracing::info!("Relay shutting down...");
            })
            .await
            .map_err(|e| Error::ApiError(format!("Server error: {}", e)))?;

        Ok(())
    }
}
