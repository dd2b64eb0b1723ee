//! Core domain types
//!
//! Transient values exchanged per request. Nothing here performs I/O and
//! nothing is persisted: tokens live only as long as the request carrying them.

mod provider;
pub mod redact;
pub mod result;
mod token;
mod window;

pub use provider::Provider;
pub use redact::{mask_token, Secret};
pub use token::{BearerTokens, Refreshed, TokenPair};
pub use window::DateWindow;
