//! Shared test utilities: an in-memory exchange and client builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};

use spotkit::auth::{API_KEY_HEADER, Credentials, sign};
use spotkit::config::ExchangeConfig;
use spotkit::transport::{RestRequest, RestResponse, RestTransport};
use spotkit::{Client, Result};

/// Example key pair from the exchange's signing documentation.
pub const API_KEY: &str = "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A";
pub const SECRET_KEY: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

/// Exchange clock reported by `GET /api/v3/time`.
pub const SERVER_TIME: i64 = 1_499_827_319_559;

/// The only millisecond at which the fake exchange has aggregated trades.
pub const TRADE_TIME: i64 = 1_498_793_709_153;

pub const TICKER_PRICES_JSON: &str = include_str!("../fixtures/ticker_prices.json");
pub const KLINES_JSON: &str = include_str!("../fixtures/klines.json");
pub const AGG_TRADES_JSON: &str = include_str!("../fixtures/agg_trades.json");
pub const EXCHANGE_INFO_JSON: &str = include_str!("../fixtures/exchange_info.json");
pub const ACCOUNT_JSON: &str = include_str!("../fixtures/account.json");
pub const ORDERS_JSON: &str = include_str!("../fixtures/orders.json");
pub const ORDER_FULL_JSON: &str = include_str!("../fixtures/order_full.json");
pub const AGG_TRADE_EVENT_JSON: &str = include_str!("../fixtures/agg_trade_event.json");

#[derive(Default)]
struct State {
    orders: Vec<Value>,
    next_order_id: u64,
    requests: Vec<RestRequest>,
    overrides: HashMap<String, RestResponse>,
}

/// In-memory exchange that answers the spot REST endpoints from fixtures.
///
/// Signed endpoints verify the API key and the HMAC signature against
/// [`SECRET_KEY`]. Real orders are stored and show up in `allOrders`;
/// test orders are only validated.
pub struct FakeExchange {
    state: Mutex<State>,
}

impl FakeExchange {
    pub fn new() -> Arc<Self> {
        let orders: Vec<Value> =
            serde_json::from_str(ORDERS_JSON).expect("orders fixture is valid JSON");

        Arc::new(Self {
            state: Mutex::new(State {
                orders,
                next_order_id: 100,
                ..State::default()
            }),
        })
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RestRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Number of orders stored by the exchange.
    pub fn order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }

    /// Answers every later request to `path` with `response`.
    pub fn respond_with(&self, path: &str, response: RestResponse) {
        self.state
            .lock()
            .unwrap()
            .overrides
            .insert(path.to_string(), response);
    }

    fn route(state: &mut State, request: &RestRequest) -> RestResponse {
        if let Some(response) = state.overrides.get(&request.path) {
            return response.clone();
        }

        let params: HashMap<String, String> = url::form_urlencoded::parse(request.query.as_bytes())
            .into_owned()
            .collect();

        let signed_path = matches!(
            request.path.as_str(),
            "/api/v3/account"
                | "/api/v3/allOrders"
                | "/api/v3/openOrders"
                | "/api/v3/order"
                | "/api/v3/order/test"
        );
        if signed_path && !is_authorized(request) {
            return error_response(401, -2014, "API-key format invalid.");
        }

        match (&request.method, request.path.as_str()) {
            (&Method::GET, "/api/v3/ping") => ok("{}"),
            (&Method::GET, "/api/v3/time") => ok(json!({ "serverTime": SERVER_TIME }).to_string()),
            (&Method::GET, "/api/v3/ticker/price") => ok(TICKER_PRICES_JSON),
            (&Method::GET, "/api/v3/klines") => ok(KLINES_JSON),
            (&Method::GET, "/api/v3/exchangeInfo") => ok(EXCHANGE_INFO_JSON),
            (&Method::GET, "/api/v3/aggTrades") => {
                if params.get("startTime") == Some(&TRADE_TIME.to_string()) {
                    ok(AGG_TRADES_JSON)
                } else {
                    ok("[]")
                }
            }
            (&Method::GET, "/api/v3/account") => ok(ACCOUNT_JSON),
            (&Method::GET, "/api/v3/allOrders") => match params.get("symbol") {
                Some(symbol) => {
                    ok(Value::from(orders_for(&state.orders, symbol, |_| true)).to_string())
                }
                None => error_response(
                    400,
                    -1102,
                    "Mandatory parameter 'symbol' was not sent, was empty/null, or malformed.",
                ),
            },
            (&Method::GET, "/api/v3/openOrders") => {
                let open = |o: &Value| o["status"] == "NEW";
                let orders: Vec<Value> = match params.get("symbol") {
                    Some(symbol) => orders_for(&state.orders, symbol, open),
                    None => state.orders.iter().filter(|o| open(o)).cloned().collect(),
                };
                ok(Value::from(orders).to_string())
            }
            (&Method::GET, "/api/v3/order") => match find_order(state, &params) {
                Some(order) => ok(order.to_string()),
                None => error_response(400, -2013, "Order does not exist."),
            },
            (&Method::DELETE, "/api/v3/order") => match find_order(state, &params) {
                Some(order) => {
                    order["status"] = json!("CANCELED");
                    ok(order.to_string())
                }
                None => error_response(400, -2011, "Unknown order sent."),
            },
            (&Method::POST, "/api/v3/order/test") => ok("{}"),
            (&Method::POST, "/api/v3/order") => {
                let order = new_order(state.next_order_id, &params);
                state.next_order_id += 1;
                state.orders.push(order.clone());
                ok(order.to_string())
            }
            _ => RestResponse::new(404, "<html>Not Found</html>"),
        }
    }
}

#[async_trait]
impl RestTransport for FakeExchange {
    async fn execute(&self, request: RestRequest) -> Result<RestResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        Ok(Self::route(&mut state, &request))
    }
}

fn ok(body: impl Into<String>) -> RestResponse {
    RestResponse::new(200, body)
}

fn error_response(status: u16, code: i64, msg: &str) -> RestResponse {
    RestResponse::new(status, json!({ "code": code, "msg": msg }).to_string())
}

fn is_authorized(request: &RestRequest) -> bool {
    if request.api_key.as_deref() != Some(API_KEY) {
        return false;
    }
    let Some((payload, signature)) = request.query.rsplit_once("&signature=") else {
        return false;
    };
    sign(SECRET_KEY, payload).is_ok_and(|expected| expected == signature)
}

fn orders_for(orders: &[Value], symbol: &str, keep: impl Fn(&Value) -> bool) -> Vec<Value> {
    orders
        .iter()
        .filter(|o| o["symbol"] == symbol && keep(o))
        .cloned()
        .collect()
}

fn find_order<'a>(state: &'a mut State, params: &HashMap<String, String>) -> Option<&'a mut Value> {
    let order_id: u64 = params.get("orderId")?.parse().ok()?;
    let symbol = params.get("symbol")?;
    state
        .orders
        .iter_mut()
        .find(|o| o["orderId"] == order_id && o["symbol"] == symbol.as_str())
}

/// Builds the stored order for a placement. Market orders fill at once;
/// limit orders rest as `NEW`.
fn new_order(order_id: u64, params: &HashMap<String, String>) -> Value {
    let param = |key: &str| params.get(key).cloned();
    let order_type = param("type").unwrap_or_default();
    let is_market = order_type == "MARKET";
    let quantity = param("quantity").unwrap_or_else(|| "0".to_string());

    json!({
        "symbol": param("symbol").unwrap_or_default(),
        "orderId": order_id,
        "clientOrderId": param("newClientOrderId").unwrap_or_else(|| format!("fake-{order_id}")),
        "time": SERVER_TIME + order_id as i64,
        "price": param("price").unwrap_or_else(|| "0".to_string()),
        "origQty": quantity,
        "executedQty": if is_market { quantity.clone() } else { "0".to_string() },
        "origQuoteOrderQty": param("quoteOrderQty").unwrap_or_else(|| "0".to_string()),
        "cummulativeQuoteQty": "0",
        "status": if is_market { "FILLED" } else { "NEW" },
        "timeInForce": param("timeInForce").unwrap_or_else(|| "GTC".to_string()),
        "type": order_type,
        "side": param("side").unwrap_or_default(),
        "fills": [],
    })
}

/// Exchange settings carrying the test key pair.
pub fn test_config() -> ExchangeConfig {
    ExchangeConfig {
        credentials: Some(Credentials::new(API_KEY, SECRET_KEY)),
        ..ExchangeConfig::default()
    }
}

/// Client with credentials over `exchange`, without the time handshake.
pub fn test_client(exchange: &Arc<FakeExchange>) -> Client {
    Client::unsynced(exchange.clone(), &test_config())
}

/// Client without credentials over `exchange`.
pub fn public_client(exchange: &Arc<FakeExchange>) -> Client {
    Client::unsynced(exchange.clone(), &ExchangeConfig::default())
}

/// Asserts that `request` carried the API key header value.
pub fn assert_signed(request: &RestRequest) {
    assert_eq!(
        request.api_key.as_deref(),
        Some(API_KEY),
        "missing {API_KEY_HEADER}"
    );
    assert!(request.query.contains("&signature="));
}
