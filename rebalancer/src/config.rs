//! TOML configuration loading and validation.

use std::collections::BTreeMap;
use std::path::Path;

use basketbook::{Basket, MatchConfig, TradeMatcher};
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub basket: BasketConfig,
    /// Current holdings by asset; assets not listed are held at zero
    #[serde(default)]
    pub holdings: BTreeMap<String, f64>,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub checks: ChecksConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasketConfig {
    pub name: String,
    /// Eligible assets in matching order
    pub assets: Vec<AssetWeight>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetWeight {
    pub asset: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub tie_tolerance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChecksConfig {
    #[serde(default = "default_weight_tolerance")]
    pub weight_tolerance: f64,
    /// Fail the run (instead of warning) when weights do not sum to 1.0
    #[serde(default)]
    pub fail_on_weight_drift: bool,
    #[serde(default = "default_max_residual")]
    pub max_residual_value: f64,
}

fn default_weight_tolerance() -> f64 {
    1e-9
}
fn default_max_residual() -> f64 {
    1e-6
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            weight_tolerance: default_weight_tolerance(),
            fail_on_weight_drift: false,
            max_residual_value: default_max_residual(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse from a TOML string (useful for testing).
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Four stablecoin tokens at equal weight with uneven holdings.
    pub fn demo() -> Self {
        let assets = ["yUSDT", "yDAI", "sFRAX", "yUSDC"]
            .into_iter()
            .map(|a| AssetWeight {
                asset: a.into(),
                weight: 0.25,
            })
            .collect();
        let holdings = [
            ("yUSDT", 1000.0),
            ("yDAI", 200.0),
            ("sFRAX", 800.0),
            ("yUSDC", 500.0),
        ]
        .into_iter()
        .map(|(a, q)| (a.to_string(), q))
        .collect();

        Self {
            basket: BasketConfig {
                name: "A".into(),
                assets,
            },
            holdings,
            matching: MatchingConfig::default(),
            checks: ChecksConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate config invariants.
    ///
    /// Weight sum is deliberately not checked here; it is reported by the
    /// pre-trade checks so a skewed basket can still be inspected.
    pub fn validate(&self) -> Result<()> {
        if self.basket.name.is_empty() {
            return Err(Error::Config("basket name must not be empty".into()));
        }
        if self.basket.assets.is_empty() {
            return Err(Error::Config("basket has no assets".into()));
        }

        let mut seen = FxHashSet::default();
        for a in &self.basket.assets {
            if a.asset.is_empty() {
                return Err(Error::Config("empty asset name".into()));
            }
            if !seen.insert(a.asset.as_str()) {
                return Err(Error::Config(format!("duplicate asset: {}", a.asset)));
            }
            if !(0.0..=1.0).contains(&a.weight) {
                return Err(Error::Config(format!(
                    "weight for {} ({}) must be in [0.0, 1.0]",
                    a.asset, a.weight
                )));
            }
        }

        for (asset, qty) in &self.holdings {
            if !seen.contains(asset.as_str()) {
                return Err(Error::Config(format!(
                    "holding for {asset} which is not a basket asset"
                )));
            }
            if !qty.is_finite() || *qty < 0.0 {
                return Err(Error::Config(format!(
                    "holding for {asset} ({qty}) must be a non-negative number"
                )));
            }
        }

        if self.matching.tie_tolerance < 0.0 {
            return Err(Error::Config("tie_tolerance must be >= 0".into()));
        }
        if self.checks.weight_tolerance <= 0.0 {
            return Err(Error::Config("weight_tolerance must be > 0".into()));
        }
        if self.checks.max_residual_value < 0.0 {
            return Err(Error::Config("max_residual_value must be >= 0".into()));
        }
        Ok(())
    }

    /// Build the basket described by this config, holdings included.
    pub fn to_basket(&self) -> Result<Basket> {
        let mut basket = Basket::new(
            self.basket.name.as_str(),
            self.basket.assets.iter().map(|a| a.asset.as_str()),
            self.basket.assets.iter().map(|a| (a.asset.as_str(), a.weight)),
        )?;
        basket.set_holdings(self.holdings.iter().map(|(a, q)| (a.as_str(), *q)));
        Ok(basket)
    }

    /// Matcher configured from the `[matching]` section.
    pub fn matcher(&self) -> TradeMatcher {
        TradeMatcher::new(MatchConfig::with_tie_tolerance(self.matching.tie_tolerance))
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> std::path::PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}
