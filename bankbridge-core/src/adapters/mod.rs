//! Adapter implementations
//!
//! One HTTP client per upstream provider:
//! - Plaid: link tokens, public-token exchange, transactions
//! - TrueLayer: auth link, code exchange, refresh, accounts, transactions
//!   (implements the `TokenRefresher` port)

mod http;
pub mod plaid;
pub mod truelayer;

pub use plaid::{LinkToken, PlaidClient, PublicTokenExchange};
pub use truelayer::{AuthLink, TrueLayerClient};
