//! Configuration management
//!
//! All configuration comes from the environment (optionally seeded from a
//! `.env` file) and is loaded once at startup:
//!
//! ```text
//! PLAID_CLIENT_ID, PLAID_SECRET, PLAID_ENV, PLAID_PRODUCTS, PLAID_COUNTRY_CODES,
//! PLAID_WEBHOOK_URL, TRUELAYER_CLIENT_ID, TRUELAYER_CLIENT_SECRET,
//! TRUELAYER_REDIRECT_URI, TRUELAYER_ENV
//! ```
//!
//! `PORT` is read by the server binary.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use regex::Regex;

use crate::domain::result::{Error, Result};
use crate::domain::Secret;

/// Default bound on every upstream call
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Environment variable overriding the Plaid base URL (staging, tests)
pub const PLAID_BASE_URL_ENV: &str = "PLAID_BASE_URL";
/// Environment variable overriding the TrueLayer auth base URL
pub const TRUELAYER_AUTH_URL_ENV: &str = "TRUELAYER_AUTH_URL";
/// Environment variable overriding the TrueLayer data API base URL
pub const TRUELAYER_API_URL_ENV: &str = "TRUELAYER_API_URL";

/// Plaid environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaidEnvironment {
    Sandbox,
    Development,
    Production,
}

impl PlaidEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Development => "https://development.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }
}

impl FromStr for PlaidEnvironment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(Error::config(format!(
                "PLAID_ENV must be one of sandbox, development, production (got '{}')",
                other
            ))),
        }
    }
}

/// TrueLayer environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrueLayerEnvironment {
    Sandbox,
    Production,
}

impl TrueLayerEnvironment {
    pub fn auth_base_url(&self) -> &'static str {
        match self {
            TrueLayerEnvironment::Sandbox => "https://auth.truelayer-sandbox.com",
            TrueLayerEnvironment::Production => "https://auth.truelayer.com",
        }
    }

    pub fn api_base_url(&self) -> &'static str {
        match self {
            TrueLayerEnvironment::Sandbox => "https://api.truelayer-sandbox.com",
            TrueLayerEnvironment::Production => "https://api.truelayer.com",
        }
    }

    /// Providers offered on the consent screen
    pub fn providers(&self) -> &'static str {
        match self {
            // Mock bank is only available in sandbox
            TrueLayerEnvironment::Sandbox => "uk-cs-mock uk-ob-all uk-oauth-all",
            TrueLayerEnvironment::Production => "uk-ob-all uk-oauth-all",
        }
    }
}

impl FromStr for TrueLayerEnvironment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" | "live" => Ok(Self::Production),
            other => Err(Error::config(format!(
                "TRUELAYER_ENV must be sandbox or production (got '{}')",
                other
            ))),
        }
    }
}

/// Plaid settings
#[derive(Debug, Clone)]
pub struct PlaidConfig {
    pub client_id: String,
    pub secret: Secret,
    pub environment: PlaidEnvironment,
    pub base_url: String,
    pub products: Vec<String>,
    /// Upper-cased ISO 3166-1 alpha-2 codes. The variable must be set, but a
    /// list of only blanks loads empty; link token creation refuses it.
    pub country_codes: Vec<String>,
    pub webhook_url: String,
    pub client_name: String,
    pub language: String,
}

/// TrueLayer settings
#[derive(Debug, Clone)]
pub struct TrueLayerConfig {
    pub client_id: String,
    pub client_secret: Secret,
    pub redirect_uri: String,
    pub environment: TrueLayerEnvironment,
    pub auth_base_url: String,
    pub api_base_url: String,
}

/// Process-wide configuration, immutable after startup
#[derive(Debug, Clone)]
pub struct Config {
    pub plaid: PlaidConfig,
    pub truelayer: TrueLayerConfig,
    pub upstream_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        Self::load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load `.env` into the process environment, if one exists
    ///
    /// Variables already set in the environment win.
    pub fn load_dotenv() {
        let _ = dotenvy::dotenv();
    }

    /// Load configuration from a key/value map
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Load configuration through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require =
            |key: &str| get(key).ok_or_else(|| Error::config(format!("{} is required", key)));

        let plaid_env: PlaidEnvironment = require("PLAID_ENV")?.parse()?;
        let plaid = PlaidConfig {
            client_id: require("PLAID_CLIENT_ID")?,
            secret: Secret::new(require("PLAID_SECRET")?),
            environment: plaid_env,
            base_url: get(PLAID_BASE_URL_ENV)
                .unwrap_or_else(|| plaid_env.base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            products: parse_list(&require("PLAID_PRODUCTS")?),
            country_codes: parse_country_codes(&require("PLAID_COUNTRY_CODES")?)?,
            webhook_url: require("PLAID_WEBHOOK_URL")?,
            client_name: get("PLAID_CLIENT_NAME").unwrap_or_else(|| "bankbridge".to_string()),
            language: get("PLAID_LANGUAGE").unwrap_or_else(|| "en".to_string()),
        };

        if plaid.products.is_empty() {
            return Err(Error::config(
                "PLAID_PRODUCTS must list at least one product",
            ));
        }

        let truelayer_env: TrueLayerEnvironment = require("TRUELAYER_ENV")?.parse()?;
        let truelayer = TrueLayerConfig {
            client_id: require("TRUELAYER_CLIENT_ID")?,
            client_secret: Secret::new(require("TRUELAYER_CLIENT_SECRET")?),
            redirect_uri: require("TRUELAYER_REDIRECT_URI")?,
            environment: truelayer_env,
            auth_base_url: get(TRUELAYER_AUTH_URL_ENV)
                .unwrap_or_else(|| truelayer_env.auth_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            api_base_url: get(TRUELAYER_API_URL_ENV)
                .unwrap_or_else(|| truelayer_env.api_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    Error::config(format!(
                        "UPSTREAM_TIMEOUT_SECS must be a number (got '{}')",
                        raw
                    ))
                })?;
                if secs == 0 {
                    return Err(Error::config(
                        "UPSTREAM_TIMEOUT_SECS must be greater than zero",
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        };

        Ok(Self {
            plaid,
            truelayer,
            upstream_timeout,
        })
    }
}

/// Split a comma-separated list, dropping blanks
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse and upper-case country codes, rejecting anything that isn't alpha-2
fn parse_country_codes(raw: &str) -> Result<Vec<String>> {
    let pattern = Regex::new(r"^[A-Z]{2}$")
        .map_err(|e| Error::config(format!("Invalid country code pattern: {}", e)))?;

    parse_list(raw)
        .into_iter()
        .map(|code| {
            let upper = code.to_ascii_uppercase();
            if pattern.is_match(&upper) {
                Ok(upper)
            } else {
                Err(Error::config(format!(
                    "PLAID_COUNTRY_CODES contains invalid code '{}'",
                    code
                )))
            }
        })
        .collect()
}
