//! Trade matcher: greedy pairing of sell and buy imbalances.
//!
//! Each sell imbalance is walked against the buy imbalances in list order:
//! 1. Equal values consume both sides in one trade
//! 2. A larger sell consumes the buy and keeps a remainder for the next buy
//! 3. A larger buy consumes the sell and keeps a remainder for the next sell
//!
//! Consumed buys are skipped, not removed, so every later sell revisits them.
//! Runtime is O(|sells| × |buys|).

use crate::arena::{ImbalanceArena, SlotId};
use crate::error::Result;
use crate::imbalance::Imbalance;
use crate::prices::PriceSource;
use crate::trade::Trade;
use crate::types::Value;

/// Matcher settings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchConfig {
    /// Largest value gap still treated as an exact tie.
    ///
    /// `0.0` (the default) compares values with `==`, bit for bit. A positive
    /// tolerance lets near-equal imbalances settle in a single trade instead
    /// of leaving dust behind; the emitted trade then carries the sell value
    /// and both full quantities, so its legs agree only within the tolerance.
    pub tie_tolerance: Value,
}

impl MatchConfig {
    /// Exact floating-point tie-break.
    pub const EXACT: MatchConfig = MatchConfig { tie_tolerance: 0.0 };

    pub fn with_tie_tolerance(tie_tolerance: Value) -> Self {
        debug_assert!(
            tie_tolerance >= 0.0,
            "tie_tolerance must be non-negative, got {tie_tolerance}"
        );
        Self { tie_tolerance }
    }
}

/// Result of one matching run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchOutcome {
    /// Trades in emission order
    pub trades: Vec<Trade>,
    /// Sell imbalances left pending once matching stopped
    pub residual_sells: Vec<Imbalance>,
    /// Buy imbalances left pending once matching stopped
    pub residual_buys: Vec<Imbalance>,
}

impl MatchOutcome {
    /// Total value transacted across all trades.
    pub fn traded_value(&self) -> Value {
        self.trades.iter().map(|t| t.value).sum()
    }

    pub fn residual_sell_value(&self) -> Value {
        self.residual_sells.iter().map(|i| i.value).sum()
    }

    pub fn residual_buy_value(&self) -> Value {
        self.residual_buys.iter().map(|i| i.value).sum()
    }

    /// True if every imbalance was fully matched.
    pub fn is_complete(&self) -> bool {
        self.residual_sells.is_empty() && self.residual_buys.is_empty()
    }
}

/// Greedy pairwise matcher.
#[derive(Clone, Copy, Debug, Default)]
pub struct TradeMatcher {
    config: MatchConfig,
}

impl TradeMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Pair `sells` with `buys` and return only the trades.
    ///
    /// Any leftover one-sided imbalance is dropped. Use [`run`](Self::run)
    /// to inspect it.
    pub fn match_trades(
        &self,
        sells: Vec<Imbalance>,
        buys: Vec<Imbalance>,
        prices: &impl PriceSource,
    ) -> Result<Vec<Trade>> {
        Ok(self.run(sells, buys, prices)?.trades)
    }

    /// Pair `sells` with `buys`, keeping the residual imbalances.
    ///
    /// `prices` is consulted only on partial fills, where the consumed
    /// quantity is re-derived as value ÷ price rather than scaled from the
    /// original quantity. Fails with [`MissingPrice`](crate::Error::MissingPrice)
    /// if such a price is unavailable.
    pub fn run(
        &self,
        sells: Vec<Imbalance>,
        buys: Vec<Imbalance>,
        prices: &impl PriceSource,
    ) -> Result<MatchOutcome> {
        let mut arena = ImbalanceArena::with_capacity(sells.len() + buys.len());
        let sell_ids = arena.extend(sells);
        let buy_ids = arena.extend(buys);

        let mut trades = Vec::new();
        for &sell_id in &sell_ids {
            for &buy_id in &buy_ids {
                if arena.is_consumed(sell_id) {
                    break;
                }
                if arena.is_consumed(buy_id) {
                    continue;
                }
                if self.pair(&mut arena, sell_id, buy_id, prices, &mut trades)? {
                    break;
                }
            }
        }

        Ok(MatchOutcome {
            trades,
            residual_sells: arena.pending(&sell_ids).cloned().collect(),
            residual_buys: arena.pending(&buy_ids).cloned().collect(),
        })
    }

    /// Match one pending sell against one pending buy.
    ///
    /// Returns `true` when the sell is used up and the inner walk must stop.
    fn pair(
        &self,
        arena: &mut ImbalanceArena,
        sell_id: SlotId,
        buy_id: SlotId,
        prices: &impl PriceSource,
        trades: &mut Vec<Trade>,
    ) -> Result<bool> {
        let sell = arena.get(sell_id).clone();
        let buy = arena.get(buy_id).clone();

        if self.is_tie(sell.value, buy.value) {
            trades.push(Trade::new(
                sell.asset,
                buy.asset,
                sell.quantity,
                buy.quantity,
                sell.value,
            ));
            arena.consume(sell_id);
            arena.consume(buy_id);
            Ok(true)
        } else if sell.value > buy.value {
            let partial_sell_qty = buy.value / prices.require(&sell.asset)?;
            trades.push(Trade::new(
                sell.asset,
                buy.asset,
                partial_sell_qty,
                buy.quantity,
                buy.value,
            ));
            arena.consume_partial(sell_id, partial_sell_qty, buy.value);
            arena.consume(buy_id);
            Ok(false)
        } else {
            let partial_buy_qty = sell.value / prices.require(&buy.asset)?;
            trades.push(Trade::new(
                sell.asset,
                buy.asset,
                sell.quantity,
                partial_buy_qty,
                sell.value,
            ));
            arena.consume_partial(buy_id, partial_buy_qty, sell.value);
            arena.consume(sell_id);
            Ok(true)
        }
    }

    #[inline]
    fn is_tie(&self, sell_value: Value, buy_value: Value) -> bool {
        sell_value == buy_value
            || (self.config.tie_tolerance > 0.0
                && (sell_value - buy_value).abs() <= self.config.tie_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AssetId;
    use crate::prices::PriceMap;

    fn unit_prices(assets: &[&str]) -> PriceMap {
        assets.iter().map(|a| (*a, 1.0)).collect()
    }

    fn sell(asset: &str, qty: f64, value: f64) -> Imbalance {
        Imbalance::sell(AssetId::new(asset), qty, value)
    }

    fn buy(asset: &str, qty: f64, value: f64) -> Imbalance {
        Imbalance::buy(AssetId::new(asset), qty, value)
    }

    #[test]
    fn empty_sells_no_trades() {
        let out = TradeMatcher::default()
            .run(vec![], vec![buy("Y", 1.0, 1.0)], &PriceMap::new())
            .unwrap();
        assert!(out.trades.is_empty());
        assert_eq!(out.residual_buys.len(), 1);
    }

    #[test]
    fn empty_buys_no_trades() {
        let trades = TradeMatcher::default()
            .match_trades(vec![sell("X", 1.0, 1.0)], vec![], &PriceMap::new())
            .unwrap();
        assert!(trades.is_empty());
    }

    #[test]
    fn exact_tie_consumes_both() {
        let out = TradeMatcher::default()
            .run(
                vec![sell("X", 50.0, 50.0)],
                vec![buy("Y", 50.0, 50.0)],
                &unit_prices(&["X", "Y"]),
            )
            .unwrap();
        assert_eq!(out.trades.len(), 1);
        assert_eq!(
            out.trades[0],
            Trade::new(AssetId::new("X"), AssetId::new("Y"), 50.0, 50.0, 50.0)
        );
        assert!(out.is_complete());
    }

    #[test]
    fn larger_sell_splits_across_buys() {
        let out = TradeMatcher::default()
            .run(
                vec![sell("X", 98.0, 98.0)],
                vec![buy("Y", 49.0, 49.0), buy("Z", 49.0, 49.0)],
                &unit_prices(&["X", "Y", "Z"]),
            )
            .unwrap();
        assert_eq!(out.trades.len(), 2);
        assert_eq!(out.trades[0].buy_asset, AssetId::new("Y"));
        assert_eq!(out.trades[0].value, 49.0);
        assert_eq!(out.trades[1].buy_asset, AssetId::new("Z"));
        assert_eq!(out.trades[1].value, 49.0);
        assert!(out.is_complete());
    }

    #[test]
    fn larger_buy_fed_by_several_sells() {
        let prices: PriceMap = [("X", 1.0), ("Y", 2.0), ("Z", 4.0)].into_iter().collect();
        let out = TradeMatcher::default()
            .run(
                vec![sell("X", 30.0, 30.0), sell("Y", 5.0, 10.0)],
                vec![buy("Z", 10.0, 40.0)],
                &prices,
            )
            .unwrap();
        assert_eq!(out.trades.len(), 2);
        // 30 of value at Z=4 is 7.5 units, then the remaining 2.5 units
        assert_eq!(out.trades[0].buy_quantity, 7.5);
        assert_eq!(out.trades[0].sell_quantity, 30.0);
        assert_eq!(out.trades[1].sell_asset, AssetId::new("Y"));
        assert_eq!(out.trades[1].buy_quantity, 2.5);
        assert_eq!(out.trades[1].value, 10.0);
        assert!(out.is_complete());
    }

    #[test]
    fn partial_sell_quantity_from_price() {
        let prices: PriceMap = [("X", 2.0), ("Y", 1.0)].into_iter().collect();
        let out = TradeMatcher::default()
            .run(
                vec![sell("X", 50.0, 100.0)],
                vec![buy("Y", 40.0, 40.0)],
                &prices,
            )
            .unwrap();
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.trades[0].sell_quantity, 20.0);
        assert_eq!(out.residual_sells.len(), 1);
        assert_eq!(out.residual_sells[0].value, 60.0);
        assert_eq!(out.residual_sells[0].quantity, 30.0);
        assert_eq!(out.residual_sell_value(), 60.0);
    }

    #[test]
    fn residual_buy_is_reported() {
        let out = TradeMatcher::default()
            .run(
                vec![sell("X", 10.0, 10.0)],
                vec![buy("Y", 25.0, 25.0)],
                &unit_prices(&["X", "Y"]),
            )
            .unwrap();
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.residual_buy_value(), 15.0);
        assert!(out.residual_sells.is_empty());
        assert!(!out.is_complete());
    }

    #[test]
    fn consumed_buys_are_skipped() {
        let out = TradeMatcher::default()
            .run(
                vec![sell("X", 10.0, 10.0), sell("W", 10.0, 10.0)],
                vec![buy("Y", 10.0, 10.0), buy("Z", 10.0, 10.0)],
                &unit_prices(&["W", "X", "Y", "Z"]),
            )
            .unwrap();
        assert_eq!(out.trades.len(), 2);
        assert_eq!(out.trades[1].sell_asset, AssetId::new("W"));
        assert_eq!(out.trades[1].buy_asset, AssetId::new("Z"));
    }

    #[test]
    fn missing_price_on_partial_fill() {
        let err = TradeMatcher::default()
            .run(
                vec![sell("X", 10.0, 10.0)],
                vec![buy("Y", 5.0, 5.0)],
                &PriceMap::new(),
            )
            .unwrap_err();
        assert_eq!(err, crate::Error::MissingPrice(AssetId::new("X")));
    }

    #[test]
    fn exact_tie_needs_no_price() {
        let trades = TradeMatcher::default()
            .match_trades(
                vec![sell("X", 1.0, 1.0)],
                vec![buy("Y", 1.0, 1.0)],
                &PriceMap::new(),
            )
            .unwrap();
        assert_eq!(trades.len(), 1);
    }

    #[test]
    fn near_tie_is_not_a_tie_by_default() {
        let out = TradeMatcher::default()
            .run(
                vec![sell("X", 10.0, 10.0 + 1e-12)],
                vec![buy("Y", 10.0, 10.0)],
                &unit_prices(&["X", "Y"]),
            )
            .unwrap();
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.residual_sells.len(), 1);
    }

    #[test]
    fn tolerance_absorbs_dust() {
        let matcher = TradeMatcher::new(MatchConfig::with_tie_tolerance(1e-9));
        let out = matcher
            .run(
                vec![sell("X", 10.0, 10.0 + 1e-12)],
                vec![buy("Y", 10.0, 10.0)],
                &unit_prices(&["X", "Y"]),
            )
            .unwrap();
        assert_eq!(out.trades.len(), 1);
        assert!(out.is_complete());
    }

    #[test]
    fn zero_value_records_are_ignored() {
        let out = TradeMatcher::default()
            .run(
                vec![sell("X", 0.0, 0.0), sell("W", 5.0, 5.0)],
                vec![buy("Y", 0.0, 0.0), buy("Z", 5.0, 5.0)],
                &unit_prices(&["W", "X", "Y", "Z"]),
            )
            .unwrap();
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.trades[0].sell_asset, AssetId::new("W"));
        assert_eq!(out.trades[0].buy_asset, AssetId::new("Z"));
        assert!(out.is_complete());
    }

    #[test]
    fn traded_value_sums_trades() {
        let out = TradeMatcher::default()
            .run(
                vec![sell("X", 98.0, 98.0)],
                vec![buy("Y", 49.0, 49.0), buy("Z", 49.0, 49.0)],
                &unit_prices(&["X", "Y", "Z"]),
            )
            .unwrap();
        assert_eq!(out.traded_value(), 98.0);
    }
}
