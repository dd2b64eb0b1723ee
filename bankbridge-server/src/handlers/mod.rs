//! HTTP handlers and routing

pub mod plaid;
pub mod truelayer;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router with every relay endpoint
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/create_link_token", post(plaid::create_link_token))
        .route(
            "/api/exchange_public_token",
            post(plaid::exchange_public_token),
        )
        .route("/api/transactions", get(plaid::transactions))
        .route("/api/truelayer/auth", post(truelayer::auth))
        .route("/api/truelayer/exchange", post(truelayer::exchange))
        .route("/api/truelayer/refresh", post(truelayer::refresh))
        .route("/api/truelayer/accounts", post(truelayer::accounts))
        .route("/api/truelayer/transactions", post(truelayer::transactions))
        .with_state(state)
}
