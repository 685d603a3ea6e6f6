//! File-based persistence: basket snapshots as JSON, trades as JSON Lines.
//!
//! # Usage
//!
//! ```ignore
//! use basketbook::Basket;
//! use std::path::Path;
//!
//! basket.save(Path::new("basket.json")).unwrap();
//! let basket = Basket::load(Path::new("basket.json")).unwrap();
//!
//! basketbook::persistence::save_trades(&trades, Path::new("trades.jsonl")).unwrap();
//! ```

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::basket::Basket;
use crate::trade::Trade;
use crate::types::{AssetId, Quantity};

/// Serializable snapshot of a basket.
///
/// Weights and holdings are stored as ordered lists (eligible order first,
/// then any extra holdings sorted by asset) so files diff cleanly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasketState {
    pub name: String,
    pub eligible: Vec<AssetId>,
    pub target_weights: Vec<(AssetId, f64)>,
    pub holdings: Vec<(AssetId, Quantity)>,
}

impl From<&Basket> for BasketState {
    fn from(basket: &Basket) -> Self {
        let eligible = basket.eligible_assets().to_vec();
        let target_weights = eligible
            .iter()
            .map(|a| (a.clone(), basket.target_weight(a)))
            .collect();

        let mut holdings: Vec<(AssetId, Quantity)> = eligible
            .iter()
            .map(|a| (a.clone(), basket.holding(a)))
            .collect();
        let mut extra: Vec<(AssetId, Quantity)> = basket
            .holdings()
            .iter()
            .filter(|(a, _)| !basket.is_eligible(a))
            .map(|(a, q)| (a.clone(), *q))
            .collect();
        extra.sort_by(|x, y| x.0.cmp(&y.0));
        holdings.extend(extra);

        Self {
            name: basket.name().to_string(),
            eligible,
            target_weights,
            holdings,
        }
    }
}

impl TryFrom<BasketState> for Basket {
    type Error = crate::Error;

    fn try_from(state: BasketState) -> Result<Self, Self::Error> {
        let mut basket = Basket::new(state.name, state.eligible, state.target_weights)?;
        basket.set_holdings(state.holdings);
        Ok(basket)
    }
}

fn invalid_data(e: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

impl Basket {
    /// Save a snapshot of this basket as pretty-printed JSON.
    ///
    /// Requires the `persistence` feature.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &BasketState::from(self)).map_err(invalid_data)?;
        writer.flush()
    }

    /// Load a basket from a JSON snapshot.
    ///
    /// The snapshot goes through [`Basket::new`], so a file with duplicate
    /// or unknown assets is rejected as `InvalidData`.
    pub fn load(path: &Path) -> io::Result<Self> {
        let file = std::fs::File::open(path)?;
        let state: BasketState =
            serde_json::from_reader(io::BufReader::new(file)).map_err(invalid_data)?;
        Basket::try_from(state).map_err(invalid_data)
    }
}

/// Save trades to a file in JSON Lines format, one trade per line.
pub fn save_trades(trades: &[Trade], path: &Path) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = io::BufWriter::new(file);

    for trade in trades {
        let json = serde_json::to_string(trade).map_err(invalid_data)?;
        writeln!(writer, "{}", json)?;
    }

    writer.flush()?;
    Ok(())
}

/// Load trades from a JSON Lines file. Empty lines are skipped.
pub fn load_trades(path: &Path) -> io::Result<Vec<Trade>> {
    let file = std::fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    let mut trades = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let trade: Trade = serde_json::from_str(line).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line {}: {}", line_num + 1, e),
            )
        })?;
        trades.push(trade);
    }

    Ok(trades)
}
