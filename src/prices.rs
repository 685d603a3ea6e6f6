//! Price lookup contract.
//!
//! The core never fetches prices itself: every valuation call takes a
//! [`PriceSource`] supplied by the caller. A missing entry is an error,
//! never a default.

use std::collections::HashMap;
use std::hash::BuildHasher;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::types::AssetId;

/// Anything that can quote a price for an asset.
///
/// Prices are expected to be strictly positive; this is a caller
/// precondition and is not checked here.
pub trait PriceSource {
    /// Price of `asset`, or `None` if unknown.
    fn price(&self, asset: &AssetId) -> Option<f64>;

    /// Price of `asset`, failing with [`Error::MissingPrice`] if unknown.
    fn require(&self, asset: &AssetId) -> Result<f64> {
        self.price(asset)
            .ok_or_else(|| Error::MissingPrice(asset.clone()))
    }
}

impl<P: PriceSource + ?Sized> PriceSource for &P {
    fn price(&self, asset: &AssetId) -> Option<f64> {
        (**self).price(asset)
    }
}

impl<S: BuildHasher> PriceSource for HashMap<AssetId, f64, S> {
    fn price(&self, asset: &AssetId) -> Option<f64> {
        self.get(asset).copied()
    }
}

/// Owned asset → price map.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceMap {
    prices: FxHashMap<AssetId, f64>,
}

impl PriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price of `asset`, returning the previous one.
    pub fn insert(&mut self, asset: impl Into<AssetId>, price: f64) -> Option<f64> {
        self.prices.insert(asset.into(), price)
    }

    pub fn get(&self, asset: &AssetId) -> Option<f64> {
        self.prices.get(asset).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, f64)> {
        self.prices.iter().map(|(a, p)| (a, *p))
    }
}

impl PriceSource for PriceMap {
    fn price(&self, asset: &AssetId) -> Option<f64> {
        self.get(asset)
    }
}

impl<A: Into<AssetId>> FromIterator<(A, f64)> for PriceMap {
    fn from_iter<I: IntoIterator<Item = (A, f64)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().map(|(a, p)| (a.into(), p)).collect(),
        }
    }
}

/// Adapter turning a lookup closure into a [`PriceSource`].
///
/// ```
/// use basketbook::{AssetId, PriceFn, PriceSource};
///
/// let oracle = PriceFn(|asset: &AssetId| (asset.as_str() == "yDAI").then_some(1.01));
/// assert_eq!(oracle.price(&AssetId::new("yDAI")), Some(1.01));
/// assert!(oracle.require(&AssetId::new("yUSDC")).is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PriceFn<F>(pub F);

impl<F> PriceSource for PriceFn<F>
where
    F: Fn(&AssetId) -> Option<f64>,
{
    fn price(&self, asset: &AssetId) -> Option<f64> {
        (self.0)(asset)
    }
}
