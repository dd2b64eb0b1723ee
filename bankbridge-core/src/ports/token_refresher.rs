//! Token refresh port

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::TokenPair;

/// Something that can trade a refresh token for a new token pair
///
/// The refresh-and-retry helper only knows about this trait, which keeps the
/// retry policy independent of the provider that issued the tokens.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchange `refresh_token` for a new access/refresh pair
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair>;
}
