//! Plaid API client
//!
//! Link-token creation, public-token exchange and a trailing 30-day
//! transaction fetch. Credentials travel in the `PLAID-CLIENT-ID` /
//! `PLAID-SECRET` headers so request bodies never carry the secret.
//!
//! API Documentation: https://plaid.com/docs/api/

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::http::{build_client, map_request_error, read_typed};
use crate::config::PlaidConfig;
use crate::domain::result::{Error, Result};
use crate::domain::{mask_token, DateWindow, Provider};

/// Length of the transaction window, in days
pub const TRANSACTION_WINDOW_DAYS: i64 = 30;

/// Transactions requested per page
pub const TRANSACTIONS_PAGE_SIZE: usize = 100;

// =============================================================================
// API Request/Response Models
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LinkTokenUser {
    pub client_user_id: String,
}

/// Body of `POST /link/token/create`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct LinkTokenRequest {
    pub client_name: String,
    pub user: LinkTokenUser,
    pub products: Vec<String>,
    pub country_codes: Vec<String>,
    pub language: String,
    pub webhook: String,
}

/// Link token handed to the client-side Link flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkToken {
    pub link_token: String,
    pub expiration: String,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
struct PublicTokenExchangeRequest<'a> {
    public_token: &'a str,
}

/// Durable access token for a linked item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicTokenExchange {
    pub access_token: String,
    pub item_id: String,
}

#[derive(Debug, Serialize)]
struct TransactionsOptions {
    count: usize,
    offset: usize,
}

#[derive(Debug, Serialize)]
struct TransactionsRequest<'a> {
    access_token: &'a str,
    start_date: String,
    end_date: String,
    options: TransactionsOptions,
}

#[derive(Debug, Deserialize)]
struct TransactionsPage {
    #[serde(default)]
    transactions: Vec<JsonValue>,
    #[serde(default)]
    total_transactions: usize,
}

// =============================================================================
// Plaid HTTP Client
// =============================================================================

/// Plaid API client bound to one configuration
#[derive(Debug, Clone)]
pub struct PlaidClient {
    client: Client,
    config: PlaidConfig,
}

impl PlaidClient {
    /// Create a new Plaid client
    pub fn new(config: PlaidConfig, timeout: Duration) -> Result<Self> {
        if config.client_id.is_empty() || config.secret.is_empty() {
            return Err(Error::config("Plaid client id and secret cannot be empty"));
        }
        Ok(Self {
            client: build_client(timeout)?,
            config,
        })
    }

    /// Create a link token for the client-side Link flow
    pub async fn create_link_token(&self) -> Result<LinkToken> {
        let request = self.build_link_token_request()?;
        tracing::info!(
            products = ?request.products,
            country_codes = ?request.country_codes,
            "creating plaid link token"
        );
        self.post("/link/token/create", &request).await
    }

    /// Exchange a public token from Link for an access token and item id
    pub async fn exchange_public_token(&self, public_token: &str) -> Result<PublicTokenExchange> {
        if public_token.trim().is_empty() {
            return Err(Error::validation("Public token is required"));
        }
        tracing::debug!(public_token = %mask_token(public_token), "exchanging plaid public token");
        self.post(
            "/item/public_token/exchange",
            &PublicTokenExchangeRequest { public_token },
        )
        .await
    }

    /// Fetch transactions from the trailing 30-day window
    ///
    /// Returns only the transactions array; Plaid's accounts/item metadata is
    /// dropped. Pages of 100 are requested until the reported total is reached.
    pub async fn get_transactions(&self, access_token: &str) -> Result<Vec<JsonValue>> {
        if access_token.trim().is_empty() {
            return Err(Error::validation("Access token is required"));
        }

        let window = DateWindow::trailing_days(Utc::now().date_naive(), TRANSACTION_WINDOW_DAYS);
        let mut transactions = Vec::new();

        loop {
            let request = TransactionsRequest {
                access_token,
                start_date: window.start_param(),
                end_date: window.end_param(),
                options: TransactionsOptions {
                    count: TRANSACTIONS_PAGE_SIZE,
                    offset: transactions.len(),
                },
            };

            let page: TransactionsPage = self.post("/transactions/get", &request).await?;
            let fetched = page.transactions.len();
            transactions.extend(page.transactions);

            if fetched == 0 || transactions.len() >= page.total_transactions {
                break;
            }
        }

        tracing::debug!(
            access_token = %mask_token(access_token),
            start_date = %window.start_param(),
            end_date = %window.end_param(),
            count = transactions.len(),
            "fetched plaid transactions"
        );

        Ok(transactions)
    }

    /// Build the link token request from configuration
    pub(crate) fn build_link_token_request(&self) -> Result<LinkTokenRequest> {
        if self.config.country_codes.is_empty() {
            return Err(Error::config(
                "PLAID_COUNTRY_CODES must list at least one country",
            ));
        }

        Ok(LinkTokenRequest {
            client_name: self.config.client_name.clone(),
            user: LinkTokenUser {
                client_user_id: Uuid::new_v4().to_string(),
            },
            products: self.config.products.clone(),
            country_codes: self.config.country_codes.clone(),
            language: self.config.language.clone(),
            webhook: self.config.webhook_url.clone(),
        })
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, endpoint);
        tracing::debug!(provider = "plaid", %endpoint, "upstream request");

        let response = self
            .client
            .post(&url)
            .header("PLAID-CLIENT-ID", &self.config.client_id)
            .header("PLAID-SECRET", self.config.secret.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| map_request_error(Provider::Plaid, e))?;

        read_typed(Provider::Plaid, response).await
    }
}

// =============================================================================
// Tests
// =============================================================================
