//! Crate-level error types.
//!
//! [`SpotkitError`] unifies every failure source (configuration, HTTP
//! transport, exchange rejections, WebSocket, JSON, the stream task) behind a
//! single enum so callers can match on the variant they care about while
//! still using `?` for propagation.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpotkitError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum SpotkitError {
    /// Configuration could not be loaded from the environment.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP request could not be completed (network, DNS, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The exchange rejected the request with its `{code, msg}` envelope.
    #[error("exchange error {code}: {message}")]
    Exchange { code: i64, message: String },

    /// A non-2xx response whose body was not an exchange error envelope.
    #[error("unexpected HTTP status {status}: {body}")]
    Http { status: u16, body: String },

    /// A WebSocket operation (connect, receive) failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value from the exchange or the caller could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// A signed endpoint was called on a client built without credentials.
    #[error("signed endpoint requires API credentials")]
    MissingCredentials,

    /// The stream task ended abnormally, e.g. a callback panicked.
    #[error("stream task failed: {0}")]
    StreamTask(#[from] tokio::task::JoinError),

    /// The aggregated-trade window contained no trades to average.
    #[error("no trades for {symbol} at {time}")]
    NoTrades { symbol: String, time: i64 },
}

impl SpotkitError {
    /// Returns the exchange error code if this is a [`SpotkitError::Exchange`].
    #[must_use]
    pub fn exchange_code(&self) -> Option<i64> {
        match self {
            Self::Exchange { code, .. } => Some(*code),
            _ => None,
        }
    }
}
