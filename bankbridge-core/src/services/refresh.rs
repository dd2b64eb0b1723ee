//! Authenticated call with reactive refresh
//!
//! ```text
//! call(access) ── ok ──────────────────────────────▶ Refreshed { data, None }
//!      │
//!      └─ 401 && refresh token ─▶ refresh ─▶ call(new access) ─▶ Refreshed { data, Some(pair) }
//! ```
//!
//! Anything else (non-401 failure, 401 without a refresh token, failed
//! refresh, failed retry) is returned as-is. There is exactly one retry.

use std::future::Future;

use crate::domain::result::Result;
use crate::domain::{mask_token, BearerTokens, Refreshed};
use crate::ports::TokenRefresher;

/// Run `call` with the caller's access token, refreshing once on 401
pub async fn call_with_refresh<T, R, F, Fut>(
    tokens: &BearerTokens,
    refresher: &R,
    call: F,
) -> Result<Refreshed<T>>
where
    R: TokenRefresher + ?Sized,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let err = match call(tokens.access_token.clone()).await {
        Ok(data) => return Ok(Refreshed::fresh(data)),
        Err(err) => err,
    };

    if !err.is_unauthorized() {
        return Err(err);
    }

    let Some(refresh_token) = tokens.refresh_token() else {
        tracing::debug!("access token rejected and no refresh token supplied");
        return Err(err);
    };

    tracing::info!(
        access_token = %mask_token(&tokens.access_token),
        "access token rejected; refreshing and retrying once"
    );

    let new_tokens = refresher.refresh(refresh_token).await?;
    let data = call(new_tokens.access_token.clone()).await?;

    Ok(Refreshed::refreshed(data, new_tokens))
}
