//! Authenticated trading and account endpoints.
//!
//! Every call here is signed; on a client without credentials they fail
//! with [`SpotkitError::MissingCredentials`](crate::SpotkitError::MissingCredentials)
//! before anything is sent.

use reqwest::Method;
use tracing::{debug, info};

use crate::Result;
use crate::client::{Client, Params};
use crate::models::{
    Account, Balance, MarketQuantity, Order, OrderKind, OrderMode, OrderRequest, TimeInForce,
};

/// Placement endpoint that executes orders.
const ORDER_PATH: &str = "/api/v3/order";

/// Placement endpoint that only validates orders.
const ORDER_TEST_PATH: &str = "/api/v3/order/test";

/// Builds the wire parameters for a placement request.
///
/// Quantities and prices go out as the exact decimal strings they were
/// built from.
#[must_use]
pub fn order_params(request: &OrderRequest) -> Params {
    let mut params = Params::new()
        .with("symbol", &request.symbol)
        .with("side", request.side.as_str())
        .with("type", request.kind.order_type().as_str())
        .with_opt("newClientOrderId", request.client_order_id.as_deref());

    match request.kind {
        OrderKind::Limit { quantity, price } => {
            params.insert("timeInForce", TimeInForce::Gtc.as_str());
            params.insert("quantity", quantity);
            params.insert("price", price);
        }
        OrderKind::Market(MarketQuantity::Base(quantity)) => {
            params.insert("quantity", quantity);
        }
        OrderKind::Market(MarketQuantity::Quote(amount)) => {
            params.insert("quoteOrderQty", amount);
        }
    }

    params
}

impl Client {
    /// Places an order.
    ///
    /// In [`OrderMode::Real`] the order is executed and the created
    /// [`Order`] is returned. In [`OrderMode::Test`] the exchange only
    /// validates it: nothing is created and `Ok(None)` signals acceptance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the exchange rejects it.
    pub async fn place_order(&self, request: &OrderRequest) -> Result<Option<Order>> {
        let params = order_params(request);

        match request.mode {
            OrderMode::Test => {
                self.send(Method::POST, ORDER_TEST_PATH, params, true)
                    .await?;
                info!(
                    symbol = request.symbol,
                    side = request.side.as_str(),
                    order_type = request.kind.order_type().as_str(),
                    "Test order accepted"
                );
                Ok(None)
            }
            OrderMode::Real => {
                let order: Order = self
                    .send_json(Method::POST, ORDER_PATH, params, true)
                    .await?;
                info!(
                    symbol = order.symbol,
                    order_id = order.order_id,
                    side = order.side.as_str(),
                    status = ?order.status,
                    "Order placed"
                );
                Ok(Some(order))
            }
        }
    }

    /// Cancels an open order and returns its final state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the exchange rejects it.
    pub async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<Order> {
        let params = Params::new()
            .with("symbol", symbol)
            .with("orderId", order_id);
        let order: Order = self
            .send_json(Method::DELETE, ORDER_PATH, params, true)
            .await?;
        info!(symbol, order_id, "Order cancelled");

        Ok(order)
    }

    /// All orders (any status) for `symbol`.
    ///
    /// The history endpoint is per symbol; there is no account-wide variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the exchange rejects it.
    pub async fn orders(&self, symbol: &str) -> Result<Vec<Order>> {
        let params = Params::new().with("symbol", symbol);
        let orders: Vec<Order> = self
            .send_json(Method::GET, "/api/v3/allOrders", params, true)
            .await?;
        debug!(symbol, count = orders.len(), "Fetched orders");

        Ok(orders)
    }

    /// Open (not yet fully filled) orders, for one symbol or all of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the exchange rejects it.
    pub async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>> {
        let params = Params::new().with_opt("symbol", symbol);
        self.send_json(Method::GET, "/api/v3/openOrders", params, true)
            .await
    }

    /// A single order by exchange ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the exchange rejects it
    /// (including an unknown order ID).
    pub async fn order(&self, symbol: &str, order_id: u64) -> Result<Order> {
        let params = Params::new()
            .with("symbol", symbol)
            .with("orderId", order_id);
        self.send_json(Method::GET, ORDER_PATH, params, true).await
    }

    /// The most recent `FILLED` order for `symbol`, or `None` if no order
    /// has filled.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching the order history fails.
    pub async fn last_filled_order(&self, symbol: &str) -> Result<Option<Order>> {
        let orders = self.orders(symbol).await?;
        Ok(last_filled(&orders).cloned())
    }

    /// Account information including every asset balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the exchange rejects it.
    pub async fn account(&self) -> Result<Account> {
        self.send_json(Method::GET, "/api/v3/account", Params::new(), true)
            .await
    }

    /// Balances with a positive free or locked amount.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching the account fails.
    pub async fn balances(&self) -> Result<Vec<Balance>> {
        let account = self.account().await?;
        Ok(held_balances(account.balances))
    }

    /// Balance of one asset; an asset the account does not hold yields a
    /// zero balance rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching the account fails.
    pub async fn balance(&self, asset: &str) -> Result<Balance> {
        let account = self.account().await?;
        Ok(find_balance(&account.balances, asset))
    }
}

/// The `FILLED` order with the greatest `time`.
#[must_use]
pub fn last_filled(orders: &[Order]) -> Option<&Order> {
    orders
        .iter()
        .filter(|o| o.is_filled())
        .max_by_key(|o| o.time)
}

/// Keeps only balances with a positive free or locked amount.
#[must_use]
pub fn held_balances(balances: Vec<Balance>) -> Vec<Balance> {
    balances.into_iter().filter(Balance::is_held).collect()
}

/// Looks `asset` up in an already-fetched list, defaulting to zero.
#[must_use]
pub fn find_balance(balances: &[Balance], asset: &str) -> Balance {
    balances
        .iter()
        .find(|b| b.asset == asset)
        .cloned()
        .unwrap_or_else(|| Balance::empty(asset))
}
