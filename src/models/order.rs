//! Order models: placement requests and the exchange's order records.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the wire-format side.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// Order type as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    StopLoss,
    StopLossLimit,
    TakeProfit,
    TakeProfitLimit,
    LimitMaker,
}

impl OrderType {
    /// Returns the wire-format order type.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
            OrderType::StopLoss => "STOP_LOSS",
            OrderType::StopLossLimit => "STOP_LOSS_LIMIT",
            OrderType::TakeProfit => "TAKE_PROFIT",
            OrderType::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
            OrderType::LimitMaker => "LIMIT_MAKER",
        }
    }
}

/// Lifecycle state of an order on the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PendingNew,
    PartiallyFilled,
    Filled,
    Canceled,
    PendingCancel,
    Rejected,
    Expired,
    ExpiredInMatch,
}

/// How long an order stays active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good 'til cancelled.
    Gtc,
    /// Immediate or cancel.
    Ioc,
    /// Fill or kill.
    Fok,
}

impl TimeInForce {
    /// Returns the wire-format time in force.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
        }
    }
}

/// A placed or historical order.
///
/// Query endpoints report the creation time as `time`; placement and
/// cancellation responses report it as `transactTime`. Both land in
/// [`Order::time`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub symbol: String,
    pub order_id: u64,
    #[serde(default)]
    pub client_order_id: String,
    pub price: Decimal,
    pub orig_qty: Decimal,
    pub executed_qty: Decimal,
    /// Quote amount requested by a quote-denominated market order.
    #[serde(default)]
    pub orig_quote_order_qty: Option<Decimal>,
    #[serde(rename = "cummulativeQuoteQty", default)]
    pub cumulative_quote_qty: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: OrderSide,
    #[serde(alias = "transactTime")]
    pub time: i64,
    #[serde(default)]
    pub update_time: Option<i64>,
    /// Immediate fills, present only on `FULL` placement responses.
    #[serde(default)]
    pub fills: Vec<Fill>,
}

impl Order {
    /// Returns `true` if the order is completely filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }
}

/// One immediate fill of a newly placed order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub price: Decimal,
    pub qty: Decimal,
    pub commission: Decimal,
    pub commission_asset: String,
    #[serde(default)]
    pub trade_id: u64,
}

/// Whether a placement executes or is only validated by the exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderMode {
    /// Execute the order (`POST /api/v3/order`).
    #[default]
    Real,
    /// Validate only (`POST /api/v3/order/test`); nothing is created.
    Test,
}

/// Size of a market order. The two variants map to different wire
/// parameters and are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketQuantity {
    /// Amount of the base asset (`quantity`).
    Base(Decimal),
    /// Amount of the quote asset to spend or receive (`quoteOrderQty`).
    Quote(Decimal),
}

/// What kind of order to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    /// Limit order, always good 'til cancelled.
    Limit { quantity: Decimal, price: Decimal },
    /// Market order sized in base or quote units.
    Market(MarketQuantity),
}

impl OrderKind {
    /// The exchange order type this kind maps to.
    #[must_use]
    pub fn order_type(&self) -> OrderType {
        match self {
            OrderKind::Limit { .. } => OrderType::Limit,
            OrderKind::Market(_) => OrderType::Market,
        }
    }
}

/// A request to place one order.
///
/// ```
/// use rust_decimal::Decimal;
/// use spotkit::models::{OrderMode, OrderRequest, OrderSide};
///
/// let request = OrderRequest::limit(
///     OrderSide::Sell,
///     "BTCUSDT",
///     "0.000204".parse::<Decimal>().unwrap(),
///     "51700".parse::<Decimal>().unwrap(),
/// )
/// .with_mode(OrderMode::Test);
/// assert_eq!(request.mode, OrderMode::Test);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub mode: OrderMode,
    pub client_order_id: Option<String>,
}

impl OrderRequest {
    /// A good-'til-cancelled limit order.
    #[must_use]
    pub fn limit(side: OrderSide, symbol: &str, quantity: Decimal, price: Decimal) -> Self {
        Self::new(side, symbol, OrderKind::Limit { quantity, price })
    }

    /// A market order for `quantity` units of the base asset.
    #[must_use]
    pub fn market_base(side: OrderSide, symbol: &str, quantity: Decimal) -> Self {
        Self::new(side, symbol, OrderKind::Market(MarketQuantity::Base(quantity)))
    }

    /// A market order spending (or receiving) `amount` of the quote asset.
    #[must_use]
    pub fn market_quote(side: OrderSide, symbol: &str, amount: Decimal) -> Self {
        Self::new(side, symbol, OrderKind::Market(MarketQuantity::Quote(amount)))
    }

    fn new(side: OrderSide, symbol: &str, kind: OrderKind) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            kind,
            mode: OrderMode::Real,
            client_order_id: None,
        }
    }

    /// Sets real or test (validate-only) placement.
    #[must_use]
    pub fn with_mode(mut self, mode: OrderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the client order ID (`newClientOrderId`).
    #[must_use]
    pub fn with_client_order_id(mut self, id: &str) -> Self {
        self.client_order_id = Some(id.to_string());
        self
    }
}
