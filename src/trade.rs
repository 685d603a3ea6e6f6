//! Trade representation

use crate::error::Result;
use crate::prices::PriceSource;
use crate::types::{AssetId, Quantity, Value};
use std::fmt;

/// A fully formed two-sided exchange: sell one asset, buy another, of equal value.
///
/// Both legs are always populated. One-sided imbalances live in
/// [`Imbalance`](crate::Imbalance) and never reach the caller as trades.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trade {
    /// Asset given up
    pub sell_asset: AssetId,
    /// Asset received
    pub buy_asset: AssetId,
    /// Units of `sell_asset` given up
    pub sell_quantity: Quantity,
    /// Units of `buy_asset` received
    pub buy_quantity: Quantity,
    /// Value transacted, in the price unit
    pub value: Value,
}

impl Trade {
    /// Create a new trade.
    pub fn new(
        sell_asset: AssetId,
        buy_asset: AssetId,
        sell_quantity: Quantity,
        buy_quantity: Quantity,
        value: Value,
    ) -> Self {
        Self {
            sell_asset,
            buy_asset,
            sell_quantity,
            buy_quantity,
            value,
        }
    }

    /// Value of the sell leg at `prices` (sell quantity × sell price).
    pub fn sell_notional(&self, prices: &impl PriceSource) -> Result<Value> {
        Ok(self.sell_quantity * prices.require(&self.sell_asset)?)
    }

    /// Value of the buy leg at `prices` (buy quantity × buy price).
    pub fn buy_notional(&self, prices: &impl PriceSource) -> Result<Value> {
        Ok(self.buy_quantity * prices.require(&self.buy_asset)?)
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trade {} -> {}, {} -> {}, value: {}",
            self.sell_asset, self.buy_asset, self.sell_quantity, self.buy_quantity, self.value
        )
    }
}
