//! Application configuration loaded from environment variables.
//!
//! Credentials are optional; without them only public endpoints work:
//! - `EXCHANGE_API_KEY` — API key sent in the `X-MBX-APIKEY` header
//! - `EXCHANGE_SECRET_KEY` — secret used to sign requests
//!
//! Optional overrides:
//! - `EXCHANGE_REST_URL` — REST base URL
//! - `EXCHANGE_WEBSOCKET_URL` — WebSocket stream base URL
//! - `EXCHANGE_RECV_WINDOW` — `recvWindow` in milliseconds for signed calls

use crate::auth::Credentials;

/// Default REST endpoint.
pub const DEFAULT_REST_URL: &str = "https://api.binance.com";

/// Default raw-stream WebSocket endpoint.
pub const DEFAULT_WEBSOCKET_URL: &str = "wss://stream.binance.com:9443/ws";

/// Default `recvWindow` in milliseconds.
pub const DEFAULT_RECV_WINDOW: u64 = 5_000;

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub exchange: ExchangeConfig,
}

/// Exchange connection settings.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub rest_url: String,
    pub websocket_url: String,
    pub recv_window: u64,
    pub credentials: Option<Credentials>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            rest_url: DEFAULT_REST_URL.to_string(),
            websocket_url: DEFAULT_WEBSOCKET_URL.to_string(),
            recv_window: DEFAULT_RECV_WINDOW,
            credentials: None,
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`SpotkitError::Config`](crate::SpotkitError::Config) if only one of the two
/// credential variables is set, or if `EXCHANGE_RECV_WINDOW` is not a
/// positive integer.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let rest_url =
        non_empty_var("EXCHANGE_REST_URL").unwrap_or_else(|| DEFAULT_REST_URL.to_string());
    let websocket_url = non_empty_var("EXCHANGE_WEBSOCKET_URL")
        .unwrap_or_else(|| DEFAULT_WEBSOCKET_URL.to_string());

    let recv_window = match non_empty_var("EXCHANGE_RECV_WINDOW") {
        Some(raw) => match raw.parse::<u64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                return Err(crate::SpotkitError::Config(format!(
                    "EXCHANGE_RECV_WINDOW must be a positive integer, got {raw:?}"
                )));
            }
        },
        None => DEFAULT_RECV_WINDOW,
    };

    let api_key = non_empty_var("EXCHANGE_API_KEY");
    let secret_key = non_empty_var("EXCHANGE_SECRET_KEY");

    let credentials = match (api_key, secret_key) {
        (Some(key), Some(secret)) => Some(Credentials::new(key, secret)),
        (Some(_), None) => {
            return Err(crate::SpotkitError::Config(
                "EXCHANGE_API_KEY is set but EXCHANGE_SECRET_KEY is missing".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(crate::SpotkitError::Config(
                "EXCHANGE_SECRET_KEY is set but EXCHANGE_API_KEY is missing".to_string(),
            ));
        }
        (None, None) => None,
    };

    Ok(AppConfig {
        exchange: ExchangeConfig {
            rest_url,
            websocket_url,
            recv_window,
            credentials,
        },
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
