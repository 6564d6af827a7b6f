//! Aggregated-trade stream models.

use rust_decimal::Decimal;
use serde::Deserialize;

/// One event from the `<symbol>@aggTrade` stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TradeEvent {
    /// Always `"aggTrade"`.
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "a")]
    pub agg_trade_id: u64,
    #[serde(rename = "p")]
    pub price: Decimal,
    #[serde(rename = "q")]
    pub quantity: Decimal,
    #[serde(rename = "f")]
    pub first_trade_id: u64,
    #[serde(rename = "l")]
    pub last_trade_id: u64,
    #[serde(rename = "T")]
    pub trade_time: i64,
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
}
