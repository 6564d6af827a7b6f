//! Signed REST client.
//!
//! [`Client`] turns `(method, path, params, signed)` into a wire request,
//! signs it when asked, runs it through a [`RestTransport`] and decodes the
//! exchange's `{code, msg}` error envelope into [`SpotkitError::Exchange`].
//!
//! A server-time handshake runs once in [`Client::connect`]; the resulting
//! clock offset is added to every signed `timestamp` so requests are not
//! rejected for falling outside `recvWindow` on a drifting local clock.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::form_urlencoded;

use crate::auth::{Credentials, now_millis};
use crate::config::ExchangeConfig;
use crate::error::SpotkitError;
use crate::models::ServerTime;
use crate::transport::{HttpTransport, RestRequest, RestResponse, RestTransport};
use crate::Result;

/// Query parameters for a REST call, encoded in stable (sorted) key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<&'static str, String>);

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key=value`, replacing any previous value for `key`.
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds `key=value` only when `value` is `Some`.
    #[must_use]
    pub fn with_opt<V: ToString>(mut self, key: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Adds `key=value` in place.
    pub fn insert(&mut self, key: &'static str, value: impl ToString) {
        self.0.insert(key, value.to_string());
    }

    /// Returns the value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Encodes the parameters as `application/x-www-form-urlencoded`.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(self.0.iter().map(|(k, v)| (*k, v.as_str())));
        serializer.finish()
    }
}

/// Builds the query string for a signed call.
///
/// The canonical parameters come first, then `recvWindow` and `timestamp`,
/// then the `signature` over everything before it.
///
/// # Errors
///
/// Propagates signing failures from [`Credentials::sign`].
pub fn signed_query(
    params: &Params,
    credentials: &Credentials,
    recv_window: u64,
    timestamp: i64,
) -> Result<String> {
    let mut serializer = form_urlencoded::Serializer::new(params.encode());
    serializer.append_pair("recvWindow", &recv_window.to_string());
    serializer.append_pair("timestamp", &timestamp.to_string());
    let mut query = serializer.finish();

    let signature = credentials.sign(&query)?;
    query.push_str("&signature=");
    query.push_str(&signature);
    Ok(query)
}

/// The exchange's error envelope, e.g. `{"code":-1121,"msg":"Invalid symbol."}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    code: i64,
    msg: String,
}

/// Maps a raw response to its body or to the appropriate [`SpotkitError`].
///
/// Non-2xx bodies carrying the envelope become [`SpotkitError::Exchange`]; anything
/// else non-2xx becomes [`SpotkitError::Http`]. A 2xx body that is itself an
/// envelope with a negative code is also an exchange error.
///
/// # Errors
///
/// See above.
pub fn decode_response(response: RestResponse) -> Result<String> {
    if response.is_success() {
        // Only an envelope-shaped body is parsed twice; payloads go straight through.
        if !looks_like_envelope(&response.body) {
            return Ok(response.body);
        }
        return match serde_json::from_str::<ApiErrorEnvelope>(&response.body) {
            Ok(env) if env.code < 0 => Err(SpotkitError::Exchange {
                code: env.code,
                message: env.msg,
            }),
            _ => Ok(response.body),
        };
    }

    match serde_json::from_str::<ApiErrorEnvelope>(&response.body).ok() {
        Some(env) => Err(SpotkitError::Exchange {
            code: env.code,
            message: env.msg,
        }),
        None => Err(SpotkitError::Http {
            status: response.status,
            body: response.body,
        }),
    }
}

/// Returns `true` if `body` opens with the `code` key of an error envelope.
fn looks_like_envelope(body: &str) -> bool {
    body.trim_start()
        .strip_prefix('{')
        .is_some_and(|rest| rest.trim_start().starts_with("\"code\""))
}

/// Authenticated session handle for the exchange's REST API.
///
/// Cheap to share behind an `Arc`; every method takes `&self` except
/// [`Client::sync_server_time`].
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn RestTransport>,
    credentials: Option<Credentials>,
    websocket_url: String,
    recv_window: u64,
    time_offset: i64,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("credentials", &self.credentials)
            .field("websocket_url", &self.websocket_url)
            .field("recv_window", &self.recv_window)
            .field("time_offset", &self.time_offset)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Connects to the REST endpoint in `config` and performs the
    /// server-time handshake.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the
    /// handshake request fails.
    pub async fn connect(config: &ExchangeConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.rest_url)?;
        Self::with_transport(Arc::new(transport), config).await
    }

    /// Like [`Client::connect`] but over a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake request fails.
    pub async fn with_transport(
        transport: Arc<dyn RestTransport>,
        config: &ExchangeConfig,
    ) -> Result<Self> {
        let mut client = Self::unsynced(transport, config);
        client.sync_server_time().await?;
        Ok(client)
    }

    /// Builds a client without the server-time handshake (offset 0).
    #[must_use]
    pub fn unsynced(transport: Arc<dyn RestTransport>, config: &ExchangeConfig) -> Self {
        Self {
            transport,
            credentials: config.credentials.clone(),
            websocket_url: config.websocket_url.clone(),
            recv_window: config.recv_window,
            time_offset: 0,
        }
    }

    /// Fetches the exchange clock and stores `server - local` as the offset
    /// applied to signed timestamps. Returns the new offset in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if `GET /api/v3/time` fails.
    pub async fn sync_server_time(&mut self) -> Result<i64> {
        let server: ServerTime = self
            .send_json(Method::GET, "/api/v3/time", Params::new(), false)
            .await?;
        self.time_offset = server.server_time - now_millis();
        info!(offset_ms = self.time_offset, "Synchronized with server time");

        Ok(self.time_offset)
    }

    /// Milliseconds added to the local clock for signed timestamps.
    #[must_use]
    pub fn time_offset(&self) -> i64 {
        self.time_offset
    }

    /// Returns `true` if the client can call signed endpoints.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// WebSocket base URL used by stream subscriptions.
    #[must_use]
    pub fn websocket_url(&self) -> &str {
        &self.websocket_url
    }

    /// Tests connectivity to the REST API.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn ping(&self) -> Result<()> {
        self.send(Method::GET, "/api/v3/ping", Params::new(), false)
            .await?;
        Ok(())
    }

    /// Sends a request and returns the raw response body.
    ///
    /// When `signed` is set, `recvWindow`, `timestamp` and `signature` are
    /// appended and the API key header is attached.
    ///
    /// # Errors
    ///
    /// - [`SpotkitError::MissingCredentials`] for a signed call without credentials
    ///   (nothing is sent).
    /// - [`SpotkitError::Transport`] if the HTTP exchange fails.
    /// - [`SpotkitError::Exchange`] / [`SpotkitError::Http`] for rejected requests.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        params: Params,
        signed: bool,
    ) -> Result<String> {
        let (query, api_key) = if signed {
            let credentials = self
                .credentials
                .as_ref()
                .ok_or(SpotkitError::MissingCredentials)?;
            let timestamp = now_millis() + self.time_offset;
            let query = signed_query(&params, credentials, self.recv_window, timestamp)?;
            (query, Some(credentials.api_key().to_string()))
        } else {
            (params.encode(), None)
        };

        debug!(%method, path, signed, "Sending request");
        let response = self
            .transport
            .execute(RestRequest {
                method,
                path: path.to_string(),
                query,
                api_key,
            })
            .await?;

        decode_response(response)
    }

    /// Sends a request and deserializes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Everything [`Client::send`] returns, plus [`SpotkitError::Json`] if the body
    /// does not match `T`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: Params,
        signed: bool,
    ) -> Result<T> {
        let body = self.send(method, path, params, signed).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
