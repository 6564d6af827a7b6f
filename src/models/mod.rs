//! Typed models for the exchange's REST responses and stream events.
//!
//! Prices and quantities are [`rust_decimal::Decimal`]: they are parsed
//! from, and serialized back to, the exchange's decimal strings without
//! ever passing through binary floating point.

pub mod account;
pub mod market;
pub mod order;
pub mod trade;

pub use account::{Account, Balance};
pub use market::{
    AggTrade, ExchangeInfo, Kline, KlineInterval, LotSizeFilter, PriceFilter, ServerTime,
    SymbolFilter, SymbolInfo, TickerPrice,
};
pub use order::{
    Fill, MarketQuantity, Order, OrderKind, OrderMode, OrderRequest, OrderSide, OrderStatus,
    OrderType, TimeInForce,
};
pub use trade::TradeEvent;
