//! API credentials and request signing.
//!
//! Signed endpoints carry the API key in the `X-MBX-APIKEY` header and a
//! `signature` query parameter computed as
//! `hex(HMAC-SHA256(secret, query_string))`, where `query_string` is the
//! exact encoded string sent to the exchange (including `timestamp` and
//! `recvWindow`).

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::Result;

/// Header that carries the API key on authenticated requests.
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// API key and secret used for signed endpoints.
///
/// The secret is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    secret_key: Zeroizing<String>,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: Zeroizing::new(secret_key.into()),
        }
    }

    /// Returns the public API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Signs `query` with this pair's secret.
    ///
    /// # Errors
    ///
    /// Returns [`SpotkitError::Parse`](crate::SpotkitError::Parse) if the secret cannot be
    /// used as an HMAC key.
    pub fn sign(&self, query: &str) -> Result<String> {
        sign(&self.secret_key, query)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Computes the `signature` parameter for a query string.
///
/// Algorithm: `hex(HMAC-SHA256(secret, query))`, lowercase.
///
/// # Errors
///
/// Returns [`SpotkitError::Parse`](crate::SpotkitError::Parse) if the HMAC key is rejected.
pub fn sign(secret: &str, query: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::SpotkitError::Parse(format!("invalid HMAC key: {e}")))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Milliseconds since the UNIX epoch according to the local clock.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vector from the exchange's signed-endpoint documentation.
    const DOC_SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
    const DOC_QUERY: &str = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
    const DOC_SIGNATURE: &str = "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71";

    #[test]
    fn sign_matches_reference_vector() {
        assert_eq!(sign(DOC_SECRET, DOC_QUERY).unwrap(), DOC_SIGNATURE);
    }

    #[test]
    fn credentials_sign_uses_secret() {
        let creds = Credentials::new(
            "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A",
            DOC_SECRET,
        );
        assert_eq!(creds.sign(DOC_QUERY).unwrap(), DOC_SIGNATURE);
    }

    #[test]
    fn signature_depends_on_query() {
        let a = sign(DOC_SECRET, "symbol=BTCUSDT&timestamp=1").unwrap();
        let b = sign(DOC_SECRET, "symbol=BTCUSDT&timestamp=2").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = Credentials::new("key", "super-secret");
        let printed = format!("{creds:?}");
        assert!(printed.contains("key"));
        assert!(!printed.contains("super-secret"));
    }
}
