//! One-sided imbalance records.

use std::fmt;

use crate::types::{AssetId, Quantity, Value};

/// Direction in which an asset is off its target allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImbalanceSide {
    /// Holding more value than the target: this much must be sold.
    Sell,
    /// Holding less value than the target: this much must be bought.
    Buy,
}

impl fmt::Display for ImbalanceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImbalanceSide::Sell => write!(f, "SELL"),
            ImbalanceSide::Buy => write!(f, "BUY"),
        }
    }
}

/// The gap between current and target holdings for a single asset.
///
/// `value` is always positive for records produced by a [`Basket`](crate::Basket);
/// assets that are on target (or off in the other direction) produce no record.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Imbalance {
    pub asset: AssetId,
    pub side: ImbalanceSide,
    pub quantity: Quantity,
    pub value: Value,
}

impl Imbalance {
    pub fn sell(asset: AssetId, quantity: Quantity, value: Value) -> Self {
        Self {
            asset,
            side: ImbalanceSide::Sell,
            quantity,
            value,
        }
    }

    pub fn buy(asset: AssetId, quantity: Quantity, value: Value) -> Self {
        Self {
            asset,
            side: ImbalanceSide::Buy,
            quantity,
            value,
        }
    }
}

impl fmt::Display for Imbalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} (value {})",
            self.side, self.quantity, self.asset, self.value
        )
    }
}

/// Sell-side and buy-side imbalances derived from one valuation.
///
/// Both lists follow the basket's eligible-asset order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Imbalances {
    /// Total basket value the targets were computed from
    pub total_value: Value,
    pub sells: Vec<Imbalance>,
    pub buys: Vec<Imbalance>,
}

impl Imbalances {
    pub fn total_sell_value(&self) -> Value {
        self.sells.iter().map(|i| i.value).sum()
    }

    pub fn total_buy_value(&self) -> Value {
        self.buys.iter().map(|i| i.value).sum()
    }

    /// True when no asset is off target.
    pub fn is_balanced(&self) -> bool {
        self.sells.is_empty() && self.buys.is_empty()
    }
}
