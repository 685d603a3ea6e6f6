//! Price snapshot (prices.json) loading and validation.

use std::path::Path;

use basketbook::{AssetId, PriceMap};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point-in-time set of asset prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub timestamp: DateTime<Utc>,
    pub prices: Vec<PriceQuote>,
}

/// A single asset price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub asset: String,
    pub price: f64,
}

impl PriceSnapshot {
    /// Load and validate a prices.json file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::PricesRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: PriceSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Snapshot a price map, sorted by asset.
    pub fn from_price_map(prices: &PriceMap, timestamp: DateTime<Utc>) -> Self {
        let mut quotes: Vec<PriceQuote> = prices
            .iter()
            .map(|(asset, price)| PriceQuote {
                asset: asset.to_string(),
                price,
            })
            .collect();
        quotes.sort_by(|a, b| a.asset.cmp(&b.asset));
        Self {
            timestamp,
            prices: quotes,
        }
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Prices(format!("failed to serialize snapshot: {e}")))?;
        std::fs::write(path, json).map_err(|e| Error::PricesWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Validate the snapshot.
    fn validate(&self) -> Result<()> {
        if self.prices.is_empty() {
            return Err(Error::Prices("prices list is empty".into()));
        }

        let mut seen = FxHashSet::default();
        for q in &self.prices {
            if q.asset.is_empty() {
                return Err(Error::Prices("empty asset name".into()));
            }
            if !seen.insert(&q.asset) {
                return Err(Error::Prices(format!("duplicate asset: {}", q.asset)));
            }
            if !q.price.is_finite() || q.price <= 0.0 {
                return Err(Error::Prices(format!(
                    "price for {} ({}) must be a positive number",
                    q.asset, q.price
                )));
            }
        }

        Ok(())
    }

    /// Convert to a price map for the basket.
    pub fn to_price_map(&self) -> PriceMap {
        self.prices
            .iter()
            .map(|q| (AssetId::new(q.asset.as_str()), q.price))
            .collect()
    }
}
