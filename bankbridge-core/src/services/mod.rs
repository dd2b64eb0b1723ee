//! Services
//!
//! Provider-independent logic used by the adapters and the server.

pub mod logging;
pub mod oauth_state;
pub mod refresh;

pub use oauth_state::{random_token, StateSigner};
pub use refresh::call_with_refresh;
