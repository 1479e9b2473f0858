//! Axum-based HTTP server.

use crate::handlers;
use crate::RpcError;
use axum::routing::{get, post};
use axum::Router;
use quickdraw_engine::{GameEngine, ShutdownController};
use std::sync::Arc;

pub struct RpcServer {
    pub port: u16,
}

impl RpcServer {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Build the router over the shared engine.
    pub fn router(engine: Arc<GameEngine>) -> Router {
        Router::new()
            .route("/commands/challenge", post(handlers::create_challenge))
            .route("/commands/play", post(handlers::start_solo))
            .route("/callbacks/payment", post(handlers::payment_callback))
            .route("/callbacks/response", post(handlers::response_callback))
            .route("/game/score", post(handlers::submit_score))
            .route("/payment/:id/status", get(handlers::payment_status))
            .route("/challenge/status/:identity", get(handlers::challenge_status))
            .route("/players/:identity", get(handlers::player))
            .route("/leaderboard", get(handlers::leaderboard))
            .route("/telemetry", get(handlers::telemetry))
            .with_state(engine)
    }

    /// Serve until shutdown is signalled.
    pub async fn serve(
        &self,
        engine: Arc<GameEngine>,
        shutdown: &ShutdownController,
    ) -> Result<(), RpcError> {
        let app = Self::router(engine);
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        tracing::info!(%addr, "rpc server listening");

        let mut shutdown_rx = shutdown.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                tracing::info!("rpc server shutting down");
            })
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
