//! Public market data models: server time, ticker prices, klines,
//! aggregated trades and exchange symbol metadata.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Response from `GET /api/v3/time`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    pub server_time: i64,
}

/// Latest price for one symbol, from `GET /api/v3/ticker/price`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// Candle width accepted by the klines endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KlineInterval {
    OneSecond,
    OneMinute,
    ThreeMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FourHours,
    SixHours,
    EightHours,
    TwelveHours,
    OneDay,
    ThreeDays,
    OneWeek,
    OneMonth,
}

impl KlineInterval {
    /// Returns the wire-format interval expected by the exchange.
    pub fn as_str(&self) -> &'static str {
        match self {
            KlineInterval::OneSecond => "1s",
            KlineInterval::OneMinute => "1m",
            KlineInterval::ThreeMinutes => "3m",
            KlineInterval::FiveMinutes => "5m",
            KlineInterval::FifteenMinutes => "15m",
            KlineInterval::ThirtyMinutes => "30m",
            KlineInterval::OneHour => "1h",
            KlineInterval::TwoHours => "2h",
            KlineInterval::FourHours => "4h",
            KlineInterval::SixHours => "6h",
            KlineInterval::EightHours => "8h",
            KlineInterval::TwelveHours => "12h",
            KlineInterval::OneDay => "1d",
            KlineInterval::ThreeDays => "3d",
            KlineInterval::OneWeek => "1w",
            KlineInterval::OneMonth => "1M",
        }
    }
}

impl std::str::FromStr for KlineInterval {
    type Err = crate::SpotkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let interval = match s {
            "1s" => KlineInterval::OneSecond,
            "1m" => KlineInterval::OneMinute,
            "3m" => KlineInterval::ThreeMinutes,
            "5m" => KlineInterval::FiveMinutes,
            "15m" => KlineInterval::FifteenMinutes,
            "30m" => KlineInterval::ThirtyMinutes,
            "1h" => KlineInterval::OneHour,
            "2h" => KlineInterval::TwoHours,
            "4h" => KlineInterval::FourHours,
            "6h" => KlineInterval::SixHours,
            "8h" => KlineInterval::EightHours,
            "12h" => KlineInterval::TwelveHours,
            "1d" => KlineInterval::OneDay,
            "3d" => KlineInterval::ThreeDays,
            "1w" => KlineInterval::OneWeek,
            "1M" => KlineInterval::OneMonth,
            other => {
                return Err(crate::SpotkitError::Parse(format!("unknown kline interval {other:?}")));
            }
        };
        Ok(interval)
    }
}

/// One OHLCV candle.
///
/// On the wire a kline is a positional array:
/// `[openTime, open, high, low, close, volume, closeTime, quoteVolume,
/// trades, takerBuyBase, takerBuyQuote, ignore]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawKline")]
pub struct Kline {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: i64,
    pub quote_volume: Decimal,
    pub trades: u64,
    pub taker_buy_base_volume: Decimal,
    pub taker_buy_quote_volume: Decimal,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct RawKline(
    i64,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    i64,
    Decimal,
    u64,
    Decimal,
    Decimal,
    serde::de::IgnoredAny,
);

impl From<RawKline> for Kline {
    fn from(raw: RawKline) -> Self {
        Self {
            open_time: raw.0,
            open: raw.1,
            high: raw.2,
            low: raw.3,
            close: raw.4,
            volume: raw.5,
            close_time: raw.6,
            quote_volume: raw.7,
            trades: raw.8,
            taker_buy_base_volume: raw.9,
            taker_buy_quote_volume: raw.10,
        }
    }
}

/// An aggregated trade from `GET /api/v3/aggTrades`: consecutive fills at
/// the same price from the same taker order, merged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggTrade {
    #[serde(rename = "a")]
    pub id: u64,
    #[serde(rename = "p")]
    pub price: Decimal,
    #[serde(rename = "q")]
    pub quantity: Decimal,
    #[serde(rename = "f")]
    pub first_trade_id: u64,
    #[serde(rename = "l")]
    pub last_trade_id: u64,
    #[serde(rename = "T")]
    pub time: i64,
    /// `true` when the buyer was the maker (i.e. the taker sold).
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
}

/// Response from `GET /api/v3/exchangeInfo`, reduced to symbol metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub server_time: i64,
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
}

impl ExchangeInfo {
    /// Linear scan for a symbol's metadata.
    #[must_use]
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolInfo> {
        self.symbols.iter().find(|s| s.symbol == symbol)
    }
}

/// Trading rules for one symbol.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub base_asset: String,
    #[serde(default)]
    pub quote_asset: String,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

impl SymbolInfo {
    /// First `LOT_SIZE` filter, if the symbol has one.
    #[must_use]
    pub fn lot_size(&self) -> Option<LotSizeFilter> {
        self.filters.iter().find_map(|f| match f {
            SymbolFilter::LotSize(lot) => Some(*lot),
            _ => None,
        })
    }

    /// First `PRICE_FILTER` filter, if the symbol has one.
    #[must_use]
    pub fn price_filter(&self) -> Option<PriceFilter> {
        self.filters.iter().find_map(|f| match f {
            SymbolFilter::Price(price) => Some(*price),
            _ => None,
        })
    }
}

/// A symbol filter, tagged by `filterType`. Only the two the client uses
/// are decoded; the rest collapse into [`SymbolFilter::Other`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "LOT_SIZE")]
    LotSize(LotSizeFilter),
    #[serde(rename = "PRICE_FILTER")]
    Price(PriceFilter),
    #[serde(other)]
    Other,
}

/// Quantity granularity rule. The default (all zero) stands for "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSizeFilter {
    pub min_qty: Decimal,
    pub max_qty: Decimal,
    pub step_size: Decimal,
}

/// Price granularity rule. The default (all zero) stands for "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilter {
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub tick_size: Decimal,
}
