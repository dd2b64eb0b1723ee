//! Plaid endpoints

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use bankbridge_core::{Error, LinkToken, PublicTokenExchange};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExchangePublicTokenRequest {
    #[serde(default)]
    public_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    #[serde(default)]
    access_token: Option<String>,
}

/// POST /api/create_link_token
pub async fn create_link_token(State(ctx): State<AppState>) -> Result<Json<LinkToken>, ApiError> {
    let token = ctx
        .plaid
        .create_link_token()
        .await
        .map_err(ApiError::wrapped("Failed to create link token"))?;
    Ok(Json(token))
}

/// POST /api/exchange_public_token
pub async fn exchange_public_token(
    State(ctx): State<AppState>,
    payload: Result<Json<ExchangePublicTokenRequest>, JsonRejection>,
) -> Result<Json<PublicTokenExchange>, ApiError> {
    let Json(request) = payload?;
    let public_token = request
        .public_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::validation("Public token is required"))?;

    let exchanged = ctx.plaid.exchange_public_token(&public_token).await?;
    Ok(Json(exchanged))
}

/// GET /api/transactions?access_token=
pub async fn transactions(
    State(ctx): State<AppState>,
    query: Result<Query<TransactionsQuery>, QueryRejection>,
) -> Result<Json<Vec<JsonValue>>, ApiError> {
    let Query(query) = query?;
    let access_token = query
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::validation("Access token is required"))?;

    let transactions = ctx.plaid.get_transactions(&access_token).await?;
    Ok(Json(transactions))
}
