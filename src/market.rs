//! Public market data endpoints. None of these require credentials.

use reqwest::Method;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::Result;
use crate::client::{Client, Params};
use crate::error::SpotkitError;
use crate::models::{
    AggTrade, ExchangeInfo, Kline, KlineInterval, LotSizeFilter, PriceFilter, TickerPrice,
};

impl Client {
    /// Latest price for every symbol, in the order the exchange returns them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn ticker_prices(&self) -> Result<Vec<TickerPrice>> {
        self.send_json(Method::GET, "/api/v3/ticker/price", Params::new(), false)
            .await
    }

    /// Latest price for `symbol` as the exchange's decimal string.
    ///
    /// An unlisted symbol is not an error: it yields an empty string.
    ///
    /// # Errors
    ///
    /// Returns an error only if fetching the price list fails.
    pub async fn ticker_price(&self, symbol: &str) -> Result<String> {
        let prices = self.ticker_prices().await?;

        match prices.iter().find(|p| p.symbol == symbol) {
            Some(p) => Ok(p.price.to_string()),
            None => {
                warn!(symbol, "Symbol not found in ticker prices");
                Ok(String::new())
            }
        }
    }

    /// Historical candles for `symbol`, oldest first.
    ///
    /// `start_time` and `limit` are only sent when positive; `None`, zero
    /// and negative values all mean "unset".
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        start_time: Option<i64>,
        limit: Option<u16>,
    ) -> Result<Vec<Kline>> {
        let params = Params::new()
            .with("symbol", symbol)
            .with("interval", interval.as_str())
            .with_opt("startTime", start_time.filter(|t| *t > 0))
            .with_opt("limit", limit.filter(|l| *l > 0));

        let mut klines: Vec<Kline> = self
            .send_json(Method::GET, "/api/v3/klines", params, false)
            .await?;
        klines.sort_by_key(|k| k.open_time);
        debug!(symbol, interval = interval.as_str(), count = klines.len(), "Fetched klines");

        Ok(klines)
    }

    /// Aggregated trades for `symbol` between `start_time` and `end_time`
    /// (milliseconds, inclusive).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn agg_trades(
        &self,
        symbol: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<Vec<AggTrade>> {
        let params = Params::new()
            .with("symbol", symbol)
            .with("startTime", start_time)
            .with("endTime", end_time);

        self.send_json(Method::GET, "/api/v3/aggTrades", params, false)
            .await
    }

    /// Mean trade price of `symbol` at the millisecond `time`, formatted to
    /// eight decimal places.
    ///
    /// # Errors
    ///
    /// Returns [`SpotkitError::NoTrades`] if nothing traded at `time`, or any
    /// error from [`Client::agg_trades`].
    pub async fn average_price_at(&self, symbol: &str, time: i64) -> Result<String> {
        let trades = self.agg_trades(symbol, time, time).await?;

        let average = average_price(&trades).ok_or_else(|| SpotkitError::NoTrades {
            symbol: symbol.to_string(),
            time,
        })?;

        Ok(format!("{:.8}", average.round_dp(8)))
    }

    /// Exchange-wide trading rules and symbol metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn exchange_info(&self) -> Result<ExchangeInfo> {
        self.send_json(Method::GET, "/api/v3/exchangeInfo", Params::new(), false)
            .await
    }

    /// `LOT_SIZE` rule for `symbol`.
    ///
    /// A symbol that is not listed, or has no such filter, yields
    /// [`LotSizeFilter::default`] (all zero) rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if fetching exchange info fails.
    pub async fn lot_size(&self, symbol: &str) -> Result<LotSizeFilter> {
        let info = self.exchange_info().await?;

        match info.symbol(symbol).and_then(|s| s.lot_size()) {
            Some(filter) => Ok(filter),
            None => {
                warn!(symbol, "No LOT_SIZE filter found");
                Ok(LotSizeFilter::default())
            }
        }
    }

    /// `PRICE_FILTER` rule (tick size) for `symbol`, with the same
    /// not-found behaviour as [`Client::lot_size`].
    ///
    /// # Errors
    ///
    /// Returns an error only if fetching exchange info fails.
    pub async fn price_filter(&self, symbol: &str) -> Result<PriceFilter> {
        let info = self.exchange_info().await?;

        match info.symbol(symbol).and_then(|s| s.price_filter()) {
            Some(filter) => Ok(filter),
            None => {
                warn!(symbol, "No PRICE_FILTER found");
                Ok(PriceFilter::default())
            }
        }
    }
}

/// Arithmetic mean of the trade prices, or `None` for an empty slice.
#[must_use]
pub fn average_price(trades: &[AggTrade]) -> Option<Decimal> {
    if trades.is_empty() {
        return None;
    }

    let sum: Decimal = trades.iter().map(|t| t.price).sum();
    Some(sum / Decimal::from(trades.len()))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn trade(id: u64, price: Decimal) -> AggTrade {
        AggTrade {
            id,
            price,
            quantity: dec!(1),
            first_trade_id: id,
            last_trade_id: id,
            time: 1_700_000_000_000,
            is_buyer_maker: false,
        }
    }

    #[test]
    fn average_of_no_trades_is_none() {
        assert_eq!(average_price(&[]), None);
    }

    #[test]
    fn average_is_arithmetic_mean() {
        let trades = [trade(1, dec!(1.0)), trade(2, dec!(2.0)), trade(3, dec!(4.0))];
        let average = average_price(&trades).unwrap();
        assert_eq!(format!("{:.8}", average.round_dp(8)), "2.33333333");
    }

    #[test]
    fn average_of_one_trade_is_its_price() {
        let average = average_price(&[trade(1, dec!(0.01633102))]).unwrap();
        assert_eq!(average, dec!(0.01633102));
    }
}
