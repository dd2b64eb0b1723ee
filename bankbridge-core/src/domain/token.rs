use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::redact::mask_token;

/// Access/refresh token pair returned by a refresh grant
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &mask_token(&self.access_token))
            .field("refresh_token", &mask_token(&self.refresh_token))
            .finish()
    }
}

/// Tokens supplied by the caller on a data request
///
/// The server keeps no session, so the caller hands these back on every call
/// and persists whatever new pair comes back.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl BearerTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Refresh token, if the caller supplied a usable one
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }
}

impl fmt::Debug for BearerTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokens")
            .field("access_token", &mask_token(&self.access_token))
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(mask_token),
            )
            .finish()
    }
}

/// Result of a call that may have refreshed its tokens on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Refreshed<T> {
    pub data: T,
    /// Set only when a refresh happened; the caller must store it
    pub new_tokens: Option<TokenPair>,
}

impl<T> Refreshed<T> {
    pub fn fresh(data: T) -> Self {
        Self {
            data,
            new_tokens: None,
        }
    }

    pub fn refreshed(data: T, tokens: TokenPair) -> Self {
        Self {
            data,
            new_tokens: Some(tokens),
        }
    }

    pub fn was_refreshed(&self) -> bool {
        self.new_tokens.is_some()
    }
}

impl Refreshed<JsonValue> {
    /// Flatten into the response payload
    ///
    /// The upstream object gains a `new_tokens` member when a refresh
    /// happened. Non-object payloads are wrapped as `{data, new_tokens}`.
    pub fn into_json(self) -> JsonValue {
        let Some(tokens) = self.new_tokens else {
            return self.data;
        };
        let tokens = serde_json::json!({
            "access_token": tokens.access_token,
            "refresh_token": tokens.refresh_token,
        });
        match self.data {
            JsonValue::Object(mut map) => {
                map.insert("new_tokens".to_string(), tokens);
                JsonValue::Object(map)
            }
            other => serde_json::json!({ "data": other, "new_tokens": tokens }),
        }
    }
}
