//! bankbridge core - Plaid and TrueLayer relay logic
//!
//! This crate is laid out in hexagonal style:
//!
//! - **domain**: transient values (tokens, date windows, errors)
//! - **ports**: traits services depend on (`TokenRefresher`)
//! - **services**: provider-independent logic (refresh-and-retry, OAuth state, logging)
//! - **adapters**: provider HTTP clients (Plaid, TrueLayer)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use adapters::{PlaidClient, TrueLayerClient};
use config::Config;

// Re-export commonly used types at crate root
pub use adapters::{AuthLink, LinkToken, PublicTokenExchange};
pub use domain::result::{Error, Result};
pub use domain::{BearerTokens, Provider, Refreshed, TokenPair};

/// Main context for relay operations
///
/// Built once at startup and shared read-only by every request handler. Each
/// provider client is bound to its own slice of the configuration.
#[derive(Debug, Clone)]
pub struct BridgeContext {
    pub config: Config,
    pub plaid: PlaidClient,
    pub truelayer: TrueLayerClient,
}

impl BridgeContext {
    /// Create the provider clients from configuration
    pub fn new(config: Config) -> Result<Self> {
        let plaid = PlaidClient::new(config.plaid.clone(), config.upstream_timeout)?;
        let truelayer = TrueLayerClient::new(config.truelayer.clone(), config.upstream_timeout)?;

        Ok(Self {
            config,
            plaid,
            truelayer,
        })
    }

    /// Load configuration from the environment and build the context
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }
}
