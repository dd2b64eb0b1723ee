//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces services depend on. Adapters implement them
//! against the real provider APIs; tests implement them with fakes.

mod token_refresher;

pub use token_refresher::TokenRefresher;
