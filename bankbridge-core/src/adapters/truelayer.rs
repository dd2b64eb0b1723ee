//! TrueLayer API client
//!
//! Authorization-code flow against the auth server plus bearer-authenticated
//! calls to the Data API. Data calls go through `call_with_refresh`, so a
//! rejected access token is refreshed and the call retried once.
//!
//! API Documentation: https://docs.truelayer.com/docs/data-api-basics

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use url::Url;

use super::http::{build_client, map_request_error, read_json, read_typed};
use crate::config::TrueLayerConfig;
use crate::domain::result::{Error, Result};
use crate::domain::{mask_token, BearerTokens, DateWindow, Provider, Refreshed, TokenPair};
use crate::ports::TokenRefresher;
use crate::services::{call_with_refresh, random_token, StateSigner};

/// Scopes requested on the consent screen
pub const SCOPES: &str =
    "info accounts balance cards transactions direct_debits standing_orders offline_access";

/// Authorization link for the client to open
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthLink {
    pub auth_url: String,
    pub state: String,
    pub nonce: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

// =============================================================================
// TrueLayer HTTP Client
// =============================================================================

/// TrueLayer API client bound to one configuration
#[derive(Debug, Clone)]
pub struct TrueLayerClient {
    client: Client,
    config: TrueLayerConfig,
    state_signer: StateSigner,
}

impl TrueLayerClient {
    /// Create a new TrueLayer client
    ///
    /// `state` values are signed with the client secret.
    pub fn new(config: TrueLayerConfig, timeout: Duration) -> Result<Self> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(Error::config(
                "TrueLayer client id and secret cannot be empty",
            ));
        }
        // Fail at startup, not on the first request
        Url::parse(&config.auth_base_url)
            .map_err(|e| Error::config(format!("Invalid TrueLayer auth URL: {}", e)))?;
        Url::parse(&config.api_base_url)
            .map_err(|e| Error::config(format!("Invalid TrueLayer API URL: {}", e)))?;

        let state_signer = StateSigner::new(config.client_secret.expose());
        Ok(Self {
            client: build_client(timeout)?,
            config,
            state_signer,
        })
    }

    /// Build the authorization URL with a signed state and a random nonce
    pub fn create_auth_link(&self) -> Result<AuthLink> {
        let state = self.state_signer.issue()?;
        let nonce = random_token(16);

        let mut url = Url::parse(&format!("{}/", self.config.auth_base_url))
            .map_err(|e| Error::config(format!("Invalid TrueLayer auth URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("scope", SCOPES)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("providers", self.config.environment.providers())
            .append_pair("state", &state)
            .append_pair("nonce", &nonce);

        Ok(AuthLink {
            auth_url: url.into(),
            state,
            nonce,
        })
    }

    /// Exchange an authorization code for tokens
    ///
    /// The upstream payload is returned verbatim. When `state` is given it
    /// must be one this relay issued; otherwise no upstream call is made.
    pub async fn exchange_code(&self, code: &str, state: Option<&str>) -> Result<JsonValue> {
        if code.trim().is_empty() {
            return Err(Error::validation("Authorization code is required"));
        }
        if let Some(state) = state {
            self.state_signer.verify(state)?;
        }

        tracing::info!("exchanging truelayer authorization code");
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        let response = self
            .client
            .post(self.token_url())
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose()),
            )
            .form(&form)
            .send()
            .await
            .map_err(|e| map_request_error(Provider::TrueLayer, e))?;

        read_json(Provider::TrueLayer, response).await
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// If the provider doesn't rotate the refresh token, the old one is kept.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair> {
        if refresh_token.trim().is_empty() {
            return Err(Error::validation("Refresh token is required"));
        }

        tracing::debug!(refresh_token = %mask_token(refresh_token), "refreshing truelayer token");
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let response = self
            .client
            .post(self.token_url())
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose()),
            )
            .form(&form)
            .send()
            .await
            .map_err(|e| map_request_error(Provider::TrueLayer, e))?;

        let refreshed: RefreshResponse = read_typed(Provider::TrueLayer, response).await?;
        Ok(TokenPair {
            access_token: refreshed.access_token,
            refresh_token: refreshed
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| refresh_token.to_string()),
        })
    }

    /// List accounts, refreshing once on 401
    pub async fn get_accounts(&self, tokens: &BearerTokens) -> Result<Refreshed<JsonValue>> {
        Self::require_access_token(tokens)?;
        let url = self.data_url(&["accounts"])?;
        let url = &url;
        call_with_refresh(tokens, self, move |access| self.get_json(url, access, None)).await
    }

    /// List month-to-date transactions for one account, refreshing once on 401
    pub async fn get_transactions(
        &self,
        tokens: &BearerTokens,
        account_id: &str,
    ) -> Result<Refreshed<JsonValue>> {
        Self::require_access_token(tokens)?;
        if account_id.trim().is_empty() {
            return Err(Error::validation("Account ID is required"));
        }

        let window = DateWindow::month_to_date(Utc::now().date_naive());
        let query = [("from", window.start_param()), ("to", window.end_param())];
        let url = self.data_url(&["accounts", account_id, "transactions"])?;
        let (url, query) = (&url, &query);

        call_with_refresh(tokens, self, move |access| {
            self.get_json(url, access, Some(query.as_slice()))
        })
        .await
    }

    fn require_access_token(tokens: &BearerTokens) -> Result<()> {
        if tokens.access_token.trim().is_empty() {
            return Err(Error::validation("Access token is required"));
        }
        Ok(())
    }

    fn token_url(&self) -> String {
        format!("{}/connect/token", self.config.auth_base_url)
    }

    /// `{api_base}/data/v1/<segments>` with each segment percent-encoded
    fn data_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_base_url)
            .map_err(|e| Error::config(format!("Invalid TrueLayer API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::config("TrueLayer API URL cannot be a base"))?
            .pop_if_empty()
            .extend(["data", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn get_json(
        &self,
        url: &Url,
        access_token: String,
        query: Option<&[(&str, String)]>,
    ) -> Result<JsonValue> {
        tracing::debug!(
            provider = "truelayer",
            path = url.path(),
            access_token = %mask_token(&access_token),
            "upstream request"
        );

        let mut request = self.client.get(url.clone()).bearer_auth(&access_token);
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .map_err(|e| map_request_error(Provider::TrueLayer, e))?;

        read_json(Provider::TrueLayer, response).await
    }
}

#[async_trait]
impl TokenRefresher for TrueLayerClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        self.refresh_token(refresh_token).await
    }
}

// =============================================================================
// Tests
// =============================================================================
