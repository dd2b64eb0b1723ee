//! Shared upstream HTTP plumbing
//!
//! Both provider clients go through these helpers so that transport failures
//! and non-2xx answers surface the same way: upstream status and body are kept
//! intact for pass-through.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::Provider;

/// Build an HTTP client bounded by `timeout`
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("bankbridge/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))
}

/// Map request errors to user-friendly messages
pub(crate) fn map_request_error(provider: Provider, error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Transport(format!("{} request timed out", provider))
    } else if error.is_connect() {
        Error::Transport(format!("Unable to connect to {} servers", provider))
    } else {
        Error::Transport(format!("{} request failed: {}", provider, error))
    }
}

/// Read a response body as JSON, turning non-2xx answers into `Error::Upstream`
pub(crate) async fn read_json(provider: Provider, response: Response) -> Result<JsonValue> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| map_request_error(provider, e))?;

    if status.is_success() {
        if bytes.is_empty() {
            return Ok(JsonValue::Null);
        }
        return serde_json::from_slice(&bytes).map_err(|e| {
            Error::Transport(format!("Failed to parse {} response: {}", provider, e))
        });
    }

    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| JsonValue::String(String::from_utf8_lossy(&bytes).into_owned()));

    tracing::warn!(
        provider = provider.as_str(),
        status = status.as_u16(),
        "upstream returned an error"
    );

    Err(Error::Upstream {
        provider,
        status: status.as_u16(),
        body,
    })
}

/// Read a response body into a typed value
pub(crate) async fn read_typed<T: DeserializeOwned>(
    provider: Provider,
    response: Response,
) -> Result<T> {
    let value = read_json(provider, response).await?;
    serde_json::from_value(value)
        .map_err(|e| Error::Transport(format!("Unexpected {} response shape: {}", provider, e)))
}
