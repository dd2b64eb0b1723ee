//! Signed OAuth `state` values
//!
//! The relay keeps no sessions, so `state` carries its own proof of origin:
//!
//! ```text
//! <nonce>.<issued_at>.<mac>
//! ```
//!
//! `nonce` is 16 random bytes (base64url), `issued_at` is unix seconds and
//! `mac` is HMAC-SHA256 over `<nonce>.<issued_at>` keyed with the client
//! secret. Anything the relay did not issue, or issued too long ago, fails
//! verification.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

use crate::domain::result::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Default lifetime of an issued state
pub const DEFAULT_STATE_MAX_AGE_SECS: i64 = 600;

/// Tolerated clock skew for states issued "in the future"
const CLOCK_SKEW_SECS: i64 = 60;

/// Random URL-safe token from the OS CSPRNG
pub fn random_token(num_bytes: usize) -> String {
    let mut bytes = vec![0u8; num_bytes];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Issues and verifies self-authenticating `state` values
#[derive(Clone)]
pub struct StateSigner {
    key: Vec<u8>,
    max_age_secs: i64,
}

impl StateSigner {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
            max_age_secs: DEFAULT_STATE_MAX_AGE_SECS,
        }
    }

    pub fn with_max_age(mut self, secs: i64) -> Self {
        self.max_age_secs = secs;
        self
    }

    /// Issue a fresh state
    pub fn issue(&self) -> Result<String> {
        self.issue_at(Utc::now().timestamp())
    }

    /// Verify a state previously produced by `issue`
    pub fn verify(&self, state: &str) -> Result<()> {
        self.verify_at(state, Utc::now().timestamp())
    }

    fn issue_at(&self, now: i64) -> Result<String> {
        let payload = format!("{}.{}", random_token(16), now);
        let mac = self.mac(&payload)?.finalize().into_bytes();
        Ok(format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(mac)))
    }

    fn verify_at(&self, state: &str, now: i64) -> Result<()> {
        let (payload, signature) = state
            .rsplit_once('.')
            .ok_or_else(|| Error::invalid_state("malformed state"))?;
        let (_nonce, issued_at) = payload
            .split_once('.')
            .ok_or_else(|| Error::invalid_state("malformed state"))?;
        let issued_at: i64 = issued_at
            .parse()
            .map_err(|_| Error::invalid_state("malformed state timestamp"))?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| Error::invalid_state("malformed state signature"))?;

        self.mac(payload)?
            .verify_slice(&signature)
            .map_err(|_| Error::invalid_state("state signature mismatch"))?;

        if issued_at > now + CLOCK_SKEW_SECS {
            return Err(Error::invalid_state("state issued in the future"));
        }
        if now - issued_at > self.max_age_secs {
            return Err(Error::invalid_state("state expired"));
        }
        Ok(())
    }

    fn mac(&self, payload: &str) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| Error::config(format!("invalid state signing key: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }
}

impl std::fmt::Debug for StateSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSigner")
            .field("max_age_secs", &self.max_age_secs)
            .finish_non_exhaustive()
    }
}
