//! Inbound HTTP surface: the payment page, the blocking `/pay` endpoint and
//! the `/callback` endpoint the terminal posts results to.

pub mod error;
pub mod handlers;

use crate::application::gateway::PaymentGateway;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    gateway: Arc<PaymentGateway>,
}

impl AppState {
    pub fn new(gateway: Arc<PaymentGateway>) -> Self {
        Self { gateway }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::landing))
        .route("/assets/gateway.js", get(handlers::gateway_script))
        .route("/healthz", get(handlers::health))
        .route("/pay", get(handlers::pay).post(handlers::pay))
        .route("/callback", post(handlers::callback))
        .with_state(state)
}

/// Serves until ctrl-c. Payments already waiting are allowed to finish,
/// which the payment timeout bounds.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
