//! Error types for the rebalancer.

use std::path::PathBuf;

/// All errors that can occur during a rebalancer run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("price file error: {0}")]
    Prices(String),

    #[error("failed to read price file {path}: {source}")]
    PricesRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse price JSON: {0}")]
    PricesParse(#[from] serde_json::Error),

    #[error("failed to write price file {path}: {source}")]
    PricesWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write trades file {path}: {source}")]
    TradesWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("pre-trade check failed: {0}")]
    CheckFailed(String),

    #[error("basket error: {0}")]
    Basket(#[from] basketbook::Error),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
