//! bankbridge server - HTTP surface of the relay

pub mod error;
pub mod handlers;

use std::sync::Arc;

use bankbridge_core::BridgeContext;

pub use error::ApiError;
pub use handlers::build_router;

/// Shared, read-only state handed to every handler
pub type AppState = Arc<BridgeContext>;
