//! Mock price oracle for demonstration runs.
//!
//! Draws each asset's price uniformly from a range. Real deployments pass a
//! price snapshot instead; this exists so the rebalancer can be exercised
//! without one.

use basketbook::{AssetId, PriceMap};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Error, Result};

/// Default price range: stablecoins trading slightly above par.
pub const DEFAULT_RANGE: (f64, f64) = (1.0, 1.1);

/// Uniform random price generator.
#[derive(Debug)]
pub struct MockOracle {
    dist: Uniform<f64>,
    rng: StdRng,
}

impl MockOracle {
    /// Create an oracle drawing from `[low, high)`.
    ///
    /// With a `seed` the generated prices are reproducible across runs.
    pub fn new(low: f64, high: f64, seed: Option<u64>) -> Result<Self> {
        if !(low.is_finite() && high.is_finite()) || low <= 0.0 || high <= low {
            return Err(Error::Config(format!(
                "oracle range [{low}, {high}) must be positive and non-empty"
            )));
        }
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            dist: Uniform::new(low, high),
            rng,
        })
    }

    /// Quote a fresh price for every asset.
    pub fn quote<'a>(&mut self, assets: impl IntoIterator<Item = &'a AssetId>) -> PriceMap {
        assets
            .into_iter()
            .map(|a| (a.clone(), self.dist.sample(&mut self.rng)))
            .collect()
    }
}
