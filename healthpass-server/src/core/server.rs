//! Server Implementation
//!
//! Plain HTTP; TLS is expected to terminate in front of the service.

use std::net::SocketAddr;

use crate::api::build_app;
use crate::core::AppState;

/// HTTP Server
pub struct Server {
    state: AppState,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Serve until Ctrl-C
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.state.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(
            addr = %addr,
            prefix = %self.state.config.api_prefix,
            environment = %self.state.config.environment,
            "healthpass listening"
        );

        self.state.rate_limiter.spawn_cleanup();

        let app = build_app(self.state);
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
