//! Parallel trade computation over independent baskets.
//!
//! Each basket is rebalanced on its own against the same prices. Trades are
//! never netted across baskets.

use rayon::prelude::*;

use crate::basket::Basket;
use crate::error::Result;
use crate::matcher::TradeMatcher;
use crate::prices::PriceSource;
use crate::trade::Trade;

/// Compute trades for every basket in parallel, with the exact-tie matcher.
///
/// Results are returned in input order, one per basket; a basket that fails
/// (e.g. on a missing price) does not affect the others.
///
/// # Example
///
/// ```
/// use basketbook::{Basket, PriceMap, batch};
///
/// let mut a = Basket::new("A", ["X", "Y"], [("X", 0.5), ("Y", 0.5)]).unwrap();
/// a.set_holdings([("X", 150.0), ("Y", 50.0)]);
/// let b = Basket::new("B", ["X", "Y"], [("X", 0.5), ("Y", 0.5)]).unwrap();
///
/// let prices: PriceMap = [("X", 1.0), ("Y", 1.0)].into_iter().collect();
/// let results = batch::compute_all(&[a, b], &prices);
/// assert_eq!(results[0].as_ref().unwrap().len(), 1);
/// assert!(results[1].as_ref().unwrap().is_empty());
/// ```
pub fn compute_all<P>(baskets: &[Basket], prices: &P) -> Vec<Result<Vec<Trade>>>
where
    P: PriceSource + Sync,
{
    compute_all_with(baskets, &TradeMatcher::default(), prices)
}

/// [`compute_all`] with a configured matcher.
pub fn compute_all_with<P>(
    baskets: &[Basket],
    matcher: &TradeMatcher,
    prices: &P,
) -> Vec<Result<Vec<Trade>>>
where
    P: PriceSource + Sync,
{
    baskets
        .par_iter()
        .map(|basket| basket.compute_trades_with(matcher, prices))
        .collect()
}
