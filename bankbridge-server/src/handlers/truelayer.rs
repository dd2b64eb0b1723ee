//! TrueLayer endpoints
//!
//! Accounts and transactions take the caller's tokens in the body. When the
//! adapter had to refresh them, the response carries `new_tokens` and the
//! caller is expected to store them.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use bankbridge_core::{AuthLink, BearerTokens, Error, TokenPair};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExchangeRequest {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default, alias = "refreshToken")]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsRequest {
    #[serde(default, alias = "access_token")]
    access_token: Option<String>,
    #[serde(default, alias = "refresh_token")]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsRequest {
    #[serde(default, alias = "access_token")]
    access_token: Option<String>,
    #[serde(default, alias = "refresh_token")]
    refresh_token: Option<String>,
    #[serde(default, alias = "account_id")]
    account_id: Option<String>,
}

fn required(value: Option<String>, message: &str) -> Result<String, Error> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::validation(message))
}

/// POST /api/truelayer/auth
pub async fn auth(State(ctx): State<AppState>) -> Result<Json<AuthLink>, ApiError> {
    Ok(Json(ctx.truelayer.create_auth_link()?))
}

/// POST /api/truelayer/exchange
pub async fn exchange(
    State(ctx): State<AppState>,
    payload: Result<Json<ExchangeRequest>, JsonRejection>,
) -> Result<Json<JsonValue>, ApiError> {
    let Json(request) = payload?;
    let code = required(request.code, "Authorization code is required")?;
    let state = request.state.filter(|s| !s.trim().is_empty());

    let tokens = ctx.truelayer.exchange_code(&code, state.as_deref()).await?;
    Ok(Json(tokens))
}

/// POST /api/truelayer/refresh
pub async fn refresh(
    State(ctx): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let Json(request) = payload?;
    let refresh_token = required(request.refresh_token, "Refresh token is required")?;

    let pair = ctx.truelayer.refresh_token(&refresh_token).await?;
    Ok(Json(pair))
}

/// POST /api/truelayer/accounts
pub async fn accounts(
    State(ctx): State<AppState>,
    payload: Result<Json<AccountsRequest>, JsonRejection>,
) -> Result<Json<JsonValue>, ApiError> {
    let Json(request) = payload?;
    let tokens = BearerTokens::new(
        required(request.access_token, "Access token is required")?,
        request.refresh_token,
    );

    let result = ctx.truelayer.get_accounts(&tokens).await?;
    Ok(Json(result.into_json()))
}

/// POST /api/truelayer/transactions
pub async fn transactions(
    State(ctx): State<AppState>,
    payload: Result<Json<TransactionsRequest>, JsonRejection>,
) -> Result<Json<JsonValue>, ApiError> {
    let Json(request) = payload?;
    let tokens = BearerTokens::new(
        required(request.access_token, "Access token is required")?,
        request.refresh_token,
    );
    let account_id = required(request.account_id, "Account ID is required")?;

    let result = ctx.truelayer.get_transactions(&tokens, &account_id).await?;
    Ok(Json(result.into_json()))
}
