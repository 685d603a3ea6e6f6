//! Basket: holdings, target weights, and value imbalances.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::imbalance::{Imbalance, Imbalances};
use crate::matcher::{MatchOutcome, TradeMatcher};
use crate::prices::PriceSource;
use crate::trade::Trade;
use crate::types::{AssetId, Quantity, Value};

/// A named set of eligible assets with target weights and current holdings.
///
/// Derived figures (total value, imbalances) are recomputed from scratch on
/// every call; nothing is cached. Callers own the holdings and replace them
/// as trades settle, and must not mutate a basket while a computation on it
/// is in progress.
#[derive(Clone, Debug, PartialEq)]
pub struct Basket {
    name: String,
    /// Eligible assets in iteration order
    eligible: Vec<AssetId>,
    target_weights: FxHashMap<AssetId, f64>,
    holdings: FxHashMap<AssetId, Quantity>,
}

impl Basket {
    /// Create a basket with zero holdings.
    ///
    /// Eligible assets without a target weight get weight zero. Weights are
    /// not required to sum to 1.0 here; see [`validate_weights`](Self::validate_weights).
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateAsset`] if an eligible asset is listed twice
    /// - [`Error::UnknownAsset`] if a weight names a non-eligible asset
    /// - [`Error::NegativeWeight`] if a weight is below zero
    /// - [`Error::NonFiniteWeight`] if a weight is NaN or infinite
    pub fn new<A, W>(
        name: impl Into<String>,
        eligible: impl IntoIterator<Item = A>,
        target_weights: impl IntoIterator<Item = (W, f64)>,
    ) -> Result<Self>
    where
        A: Into<AssetId>,
        W: Into<AssetId>,
    {
        let eligible: Vec<AssetId> = eligible.into_iter().map(Into::into).collect();

        let mut seen = FxHashSet::default();
        for asset in &eligible {
            if !seen.insert(asset) {
                return Err(Error::DuplicateAsset(asset.clone()));
            }
        }

        let mut weights = FxHashMap::default();
        for (asset, weight) in target_weights {
            let asset = asset.into();
            if !seen.contains(&asset) {
                return Err(Error::UnknownAsset(asset));
            }
            if !weight.is_finite() {
                return Err(Error::NonFiniteWeight(asset, weight));
            }
            if weight < 0.0 {
                return Err(Error::NegativeWeight(asset, weight));
            }
            weights.insert(asset, weight);
        }

        let holdings = eligible.iter().map(|a| (a.clone(), 0.0)).collect();

        Ok(Self {
            name: name.into(),
            eligible,
            target_weights: weights,
            holdings,
        })
    }

    // === Queries ===

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Eligible assets in iteration order.
    #[inline]
    pub fn eligible_assets(&self) -> &[AssetId] {
        &self.eligible
    }

    pub fn is_eligible(&self, asset: &AssetId) -> bool {
        self.eligible.contains(asset)
    }

    /// Target weight of `asset` (zero if none was given).
    pub fn target_weight(&self, asset: &AssetId) -> f64 {
        self.target_weights.get(asset).copied().unwrap_or(0.0)
    }

    /// Sum of target weights over the eligible assets.
    pub fn weight_sum(&self) -> f64 {
        self.eligible.iter().map(|a| self.target_weight(a)).sum()
    }

    /// Quantity held of `asset` (zero if absent).
    pub fn holding(&self, asset: &AssetId) -> Quantity {
        self.holdings.get(asset).copied().unwrap_or(0.0)
    }

    pub fn holdings(&self) -> &FxHashMap<AssetId, Quantity> {
        &self.holdings
    }

    // === Mutation ===

    /// Replace the holdings map wholesale.
    ///
    /// Entries for non-eligible assets are kept but ignored in valuation.
    pub fn set_holdings<A: Into<AssetId>>(
        &mut self,
        holdings: impl IntoIterator<Item = (A, Quantity)>,
    ) {
        self.holdings = holdings.into_iter().map(|(a, q)| (a.into(), q)).collect();
    }

    /// Set the quantity held of a single asset.
    pub fn set_holding(&mut self, asset: impl Into<AssetId>, quantity: Quantity) {
        self.holdings.insert(asset.into(), quantity);
    }

    pub fn holdings_mut(&mut self) -> &mut FxHashMap<AssetId, Quantity> {
        &mut self.holdings
    }

    /// Apply settled trades to the holdings.
    ///
    /// All trades are checked before any is applied, so an error leaves the
    /// holdings untouched.
    pub fn settle(&mut self, trades: &[Trade]) -> Result<()> {
        for trade in trades {
            for asset in [&trade.sell_asset, &trade.buy_asset] {
                if !self.is_eligible(asset) {
                    return Err(Error::UnknownAsset(asset.clone()));
                }
            }
        }
        for trade in trades {
            *self.holdings.entry(trade.sell_asset.clone()).or_insert(0.0) -= trade.sell_quantity;
            *self.holdings.entry(trade.buy_asset.clone()).or_insert(0.0) += trade.buy_quantity;
        }
        Ok(())
    }

    // === Valuation ===

    /// Total value: Σ holdings × price over the eligible assets.
    ///
    /// Every eligible asset must be priced, held or not.
    pub fn total_value(&self, prices: &impl PriceSource) -> Result<Value> {
        let mut total = 0.0;
        for asset in &self.eligible {
            total += self.holding(asset) * prices.require(asset)?;
        }
        Ok(total)
    }

    /// Current weights as (asset, fraction of total value), in eligible order.
    ///
    /// Empty if the basket is worth nothing.
    pub fn current_weights(&self, prices: &impl PriceSource) -> Result<Vec<(AssetId, f64)>> {
        let total = self.total_value(prices)?;
        if total == 0.0 {
            return Ok(Vec::new());
        }
        self.eligible
            .iter()
            .map(|a| Ok((a.clone(), self.holding(a) * prices.require(a)? / total)))
            .collect()
    }

    /// Check that target weights sum to 1.0 within `tolerance`.
    ///
    /// Trade computation does not call this; skewed weights produce skewed
    /// imbalances unless the caller validates first.
    pub fn validate_weights(&self, tolerance: f64) -> Result<()> {
        let sum = self.weight_sum();
        if (sum - 1.0).abs() > tolerance {
            return Err(Error::InvalidWeights { sum, tolerance });
        }
        Ok(())
    }

    // === Imbalances ===

    /// Sell-side and buy-side imbalances from a single total value.
    ///
    /// For each eligible asset, `difference = total × weight − holding × price`.
    /// A negative difference yields a sell record, a positive one a buy
    /// record; an asset exactly on target yields nothing.
    pub fn imbalances(&self, prices: &impl PriceSource) -> Result<Imbalances> {
        let total_value = self.total_value(prices)?;

        let mut sells = Vec::new();
        let mut buys = Vec::new();
        for asset in &self.eligible {
            let price = prices.require(asset)?;
            let target_value = total_value * self.target_weight(asset);
            let current_value = self.holding(asset) * price;
            let difference = target_value - current_value;

            if difference < 0.0 {
                sells.push(Imbalance::sell(
                    asset.clone(),
                    difference.abs() / price,
                    difference.abs(),
                ));
            } else if difference > 0.0 {
                buys.push(Imbalance::buy(asset.clone(), difference / price, difference));
            }
        }

        Ok(Imbalances {
            total_value,
            sells,
            buys,
        })
    }

    /// Assets holding more value than their target.
    pub fn sell_imbalances(&self, prices: &impl PriceSource) -> Result<Vec<Imbalance>> {
        Ok(self.imbalances(prices)?.sells)
    }

    /// Assets holding less value than their target.
    pub fn buy_imbalances(&self, prices: &impl PriceSource) -> Result<Vec<Imbalance>> {
        Ok(self.imbalances(prices)?.buys)
    }

    // === Trades ===

    /// Trades that bring the basket back to its target weights.
    ///
    /// Uses the exact-tie matcher. Any unmatched remainder is dropped.
    pub fn compute_trades(&self, prices: &impl PriceSource) -> Result<Vec<Trade>> {
        self.compute_trades_with(&TradeMatcher::default(), prices)
    }

    /// [`compute_trades`](Self::compute_trades) with a configured matcher.
    pub fn compute_trades_with(
        &self,
        matcher: &TradeMatcher,
        prices: &impl PriceSource,
    ) -> Result<Vec<Trade>> {
        Ok(self.match_outcome(matcher, prices)?.trades)
    }

    /// Full matching result, including any unmatched remainder.
    pub fn match_outcome(
        &self,
        matcher: &TradeMatcher,
        prices: &impl PriceSource,
    ) -> Result<MatchOutcome> {
        let imbalances = self.imbalances(prices)?;
        matcher.run(imbalances.sells, imbalances.buys, prices)
    }
}

impl fmt::Display for Basket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Basket {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prices::PriceMap;

    fn id(s: &str) -> AssetId {
        AssetId::new(s)
    }

    fn unit_prices(assets: &[&str]) -> PriceMap {
        assets.iter().map(|a| (*a, 1.0)).collect()
    }

    fn half_half() -> Basket {
        Basket::new("A", ["X", "Y"], [("X", 0.5), ("Y", 0.5)]).unwrap()
    }

    #[test]
    fn new_starts_with_zero_holdings() {
        let basket = half_half();
        assert_eq!(basket.name(), "A");
        assert_eq!(basket.eligible_assets(), &[id("X"), id("Y")]);
        assert_eq!(basket.holding(&id("X")), 0.0);
        assert_eq!(basket.holdings().len(), 2);
    }

    #[test]
    fn reject_duplicate_asset() {
        let err = Basket::new("A", ["X", "X"], [("X", 1.0)]).unwrap_err();
        assert_eq!(err, Error::DuplicateAsset(id("X")));
    }

    #[test]
    fn reject_weight_for_unknown_asset() {
        let err = Basket::new("A", ["X"], [("X", 0.5), ("Q", 0.5)]).unwrap_err();
        assert_eq!(err, Error::UnknownAsset(id("Q")));
    }

    #[test]
    fn reject_negative_weight() {
        let err = Basket::new("A", ["X", "Y"], [("X", 1.5), ("Y", -0.5)]).unwrap_err();
        assert_eq!(err, Error::NegativeWeight(id("Y"), -0.5));
    }

    #[test]
    fn reject_non_finite_weight() {
        let err = Basket::new("A", ["X", "Y"], [("X", 0.5), ("Y", f64::NAN)]).unwrap_err();
        assert!(matches!(err, Error::NonFiniteWeight(ref a, w) if *a == id("Y") && w.is_nan()));

        let err = Basket::new("A", ["X"], [("X", f64::INFINITY)]).unwrap_err();
        assert!(matches!(err, Error::NonFiniteWeight(_, w) if w.is_infinite()));
    }

    #[test]
    fn missing_weight_is_zero() {
        let basket = Basket::new("A", ["X", "Y"], [("X", 1.0)]).unwrap();
        assert_eq!(basket.target_weight(&id("Y")), 0.0);
        assert_eq!(basket.weight_sum(), 1.0);
    }

    #[test]
    fn total_value_sums_eligible() {
        let mut basket = half_half();
        basket.set_holdings([("X", 10.0), ("Y", 4.0), ("Q", 1000.0)]);
        let prices: PriceMap = [("X", 2.0), ("Y", 5.0)].into_iter().collect();
        // Q is not eligible and carries no weight in the total
        assert_eq!(basket.total_value(&prices), Ok(40.0));
    }

    #[test]
    fn total_value_requires_every_price() {
        let basket = half_half();
        let prices: PriceMap = [("X", 2.0)].into_iter().collect();
        assert_eq!(
            basket.total_value(&prices),
            Err(Error::MissingPrice(id("Y")))
        );
    }

    #[test]
    fn imbalances_split_by_direction() {
        let mut basket = half_half();
        basket.set_holdings([("X", 150.0), ("Y", 50.0)]);
        let imb = basket.imbalances(&unit_prices(&["X", "Y"])).unwrap();
        assert_eq!(imb.total_value, 200.0);
        assert_eq!(imb.sells, vec![Imbalance::sell(id("X"), 50.0, 50.0)]);
        assert_eq!(imb.buys, vec![Imbalance::buy(id("Y"), 50.0, 50.0)]);
    }

    #[test]
    fn imbalance_quantity_uses_price() {
        let mut basket = half_half();
        basket.set_holdings([("X", 100.0), ("Y", 0.0)]);
        let prices: PriceMap = [("X", 2.0), ("Y", 4.0)].into_iter().collect();
        // total 200, target 100 each
        let sells = basket.sell_imbalances(&prices).unwrap();
        let buys = basket.buy_imbalances(&prices).unwrap();
        assert_eq!(sells[0].quantity, 50.0);
        assert_eq!(sells[0].value, 100.0);
        assert_eq!(buys[0].quantity, 25.0);
        assert_eq!(buys[0].value, 100.0);
    }

    #[test]
    fn on_target_asset_has_no_record() {
        let mut basket = Basket::new("A", ["X", "Y", "Z"], [("X", 0.5), ("Y", 0.25), ("Z", 0.25)])
            .unwrap();
        basket.set_holdings([("X", 50.0), ("Y", 40.0), ("Z", 10.0)]);
        let imb = basket.imbalances(&unit_prices(&["X", "Y", "Z"])).unwrap();
        assert!(imb.sells.iter().chain(&imb.buys).all(|i| i.asset != id("X")));
        assert_eq!(imb.sells.len(), 1);
        assert_eq!(imb.buys.len(), 1);
    }

    #[test]
    fn empty_basket_is_balanced() {
        let basket = half_half();
        let imb = basket.imbalances(&unit_prices(&["X", "Y"])).unwrap();
        assert!(imb.is_balanced());
        assert!(basket.compute_trades(&unit_prices(&["X", "Y"])).unwrap().is_empty());
    }

    #[test]
    fn compute_trades_exact_tie() {
        let mut basket = half_half();
        basket.set_holdings([("X", 150.0), ("Y", 50.0)]);
        let trades = basket.compute_trades(&unit_prices(&["X", "Y"])).unwrap();
        assert_eq!(trades, vec![Trade::new(id("X"), id("Y"), 50.0, 50.0, 50.0)]);
    }

    #[test]
    fn current_weights_follow_value() {
        let mut basket = half_half();
        basket.set_holdings([("X", 150.0), ("Y", 50.0)]);
        let weights = basket.current_weights(&unit_prices(&["X", "Y"])).unwrap();
        assert_eq!(weights, vec![(id("X"), 0.75), (id("Y"), 0.25)]);
    }

    #[test]
    fn current_weights_of_empty_basket() {
        let basket = half_half();
        assert!(basket.current_weights(&unit_prices(&["X", "Y"])).unwrap().is_empty());
    }

    #[test]
    fn validate_weights_within_tolerance() {
        assert!(half_half().validate_weights(1e-9).is_ok());
        let skewed = Basket::new("B", ["X", "Y"], [("X", 0.5), ("Y", 0.4)]).unwrap();
        assert!(matches!(
            skewed.validate_weights(1e-9),
            Err(Error::InvalidWeights { .. })
        ));
    }

    #[test]
    fn settle_moves_quantities() {
        let mut basket = half_half();
        basket.set_holdings([("X", 150.0), ("Y", 50.0)]);
        let prices = unit_prices(&["X", "Y"]);
        let trades = basket.compute_trades(&prices).unwrap();
        basket.settle(&trades).unwrap();
        assert_eq!(basket.holding(&id("X")), 100.0);
        assert_eq!(basket.holding(&id("Y")), 100.0);
        assert!(basket.imbalances(&prices).unwrap().is_balanced());
    }

    #[test]
    fn settle_rejects_unknown_asset_atomically() {
        let mut basket = half_half();
        basket.set_holdings([("X", 150.0), ("Y", 50.0)]);
        let trades = [
            Trade::new(id("X"), id("Y"), 10.0, 10.0, 10.0),
            Trade::new(id("X"), id("Q"), 10.0, 10.0, 10.0),
        ];
        assert_eq!(basket.settle(&trades), Err(Error::UnknownAsset(id("Q"))));
        assert_eq!(basket.holding(&id("X")), 150.0);
    }

    #[test]
    fn holdings_mut_edits_in_place() {
        let mut basket = half_half();
        basket.holdings_mut().insert(id("X"), 7.0);
        basket.set_holding("Y", 3.0);
        assert_eq!(basket.holding(&id("X")), 7.0);
        assert_eq!(basket.holding(&id("Y")), 3.0);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", half_half()), "Basket A");
    }
}
