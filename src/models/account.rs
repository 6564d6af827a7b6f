//! Account models.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Response from `GET /api/v3/account`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub maker_commission: i64,
    #[serde(default)]
    pub taker_commission: i64,
    #[serde(default)]
    pub can_trade: bool,
    #[serde(default)]
    pub can_withdraw: bool,
    #[serde(default)]
    pub can_deposit: bool,
    #[serde(default)]
    pub update_time: i64,
    #[serde(default)]
    pub account_type: String,
    pub balances: Vec<Balance>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Holdings of a single asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Balance {
    pub asset: String,
    /// Available for trading.
    pub free: Decimal,
    /// Reserved by open orders.
    pub locked: Decimal,
}

impl Balance {
    /// A zero balance for `asset`, reported for assets the account does not hold.
    #[must_use]
    pub fn empty(asset: &str) -> Self {
        Self {
            asset: asset.to_string(),
            ..Self::default()
        }
    }

    /// Returns `true` if either the free or the locked amount is positive.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.free > Decimal::ZERO || self.locked > Decimal::ZERO
    }

    /// Free plus locked.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn locked_only_balance_is_held() {
        let balance = Balance {
            asset: "BNB".to_string(),
            free: dec!(0),
            locked: dec!(0.5),
        };
        assert!(balance.is_held());
        assert_eq!(balance.total(), dec!(0.5));
    }

    #[test]
    fn empty_balance_is_not_held() {
        let balance = Balance::empty("DOGE");
        assert_eq!(balance.asset, "DOGE");
        assert!(!balance.is_held());
    }
}
