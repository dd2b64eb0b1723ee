use std::fmt;

use serde::Serialize;

/// Upstream open-banking provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Plaid,
    TrueLayer,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Plaid => "plaid",
            Provider::TrueLayer => "truelayer",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Plaid => f.write_str("Plaid"),
            Provider::TrueLayer => f.write_str("TrueLayer"),
        }
    }
}
