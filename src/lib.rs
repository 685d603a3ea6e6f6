//! # basketbook
//!
//! Deterministic rebalancing of an asset basket back to its target weights.
//!
//! ## Features
//!
//! - **Imbalances**: per-asset sell/buy value gaps from one consistent valuation
//! - **Greedy matching**: pairs sell and buy imbalances into two-sided trades
//! - **Injected prices**: any [`PriceSource`] (map, `HashMap`, closure); a missing
//!   price is an error, never a default
//! - **Type-level guarantee**: one-sided [`Imbalance`] records and two-sided
//!   [`Trade`]s are distinct types, so a half-built trade cannot leak out
//!
//! ## Quick Start
//!
//! ```
//! use basketbook::{Basket, PriceMap};
//!
//! let mut basket = Basket::new("A", ["X", "Y"], [("X", 0.5), ("Y", 0.5)]).unwrap();
//! basket.set_holdings([("X", 150.0), ("Y", 50.0)]);
//!
//! let prices: PriceMap = [("X", 1.0), ("Y", 1.0)].into_iter().collect();
//! let trades = basket.compute_trades(&prices).unwrap();
//!
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].sell_asset.as_str(), "X");
//! assert_eq!(trades[0].buy_asset.as_str(), "Y");
//! assert_eq!(trades[0].value, 50.0);
//! ```
//!
//! ## Partial Fills
//!
//! A sell imbalance larger than the first buy keeps its remainder for the
//! next buy. The consumed sell quantity is re-derived as value ÷ price.
//!
//! ```
//! use basketbook::{Basket, PriceMap};
//!
//! let mut basket = Basket::new("B", ["X", "Y", "Z"], [("X", 0.5), ("Y", 0.25), ("Z", 0.25)])
//!     .unwrap();
//! basket.set_holdings([("X", 200.0), ("Y", 0.0), ("Z", 0.0)]);
//!
//! let prices: PriceMap = [("X", 1.0), ("Y", 2.0), ("Z", 0.5)].into_iter().collect();
//! let trades = basket.compute_trades(&prices).unwrap();
//!
//! assert_eq!(trades.len(), 2);
//! assert_eq!(trades[0].buy_quantity, 25.0); // 50 of value at 2.0
//! assert_eq!(trades[1].buy_quantity, 100.0); // 50 of value at 0.5
//! ```
//!
//! ## Residual Imbalances
//!
//! [`Basket::compute_trades`] drops whatever cannot be paired. The full
//! [`MatchOutcome`] keeps it:
//!
//! ```
//! use basketbook::{Basket, PriceMap, TradeMatcher};
//!
//! // Weights sum to 0.9: sells outweigh buys
//! let mut basket = Basket::new("C", ["X", "Y"], [("X", 0.45), ("Y", 0.45)]).unwrap();
//! basket.set_holdings([("X", 100.0), ("Y", 100.0)]);
//!
//! let prices: PriceMap = [("X", 1.0), ("Y", 1.0)].into_iter().collect();
//! let outcome = basket.match_outcome(&TradeMatcher::default(), &prices).unwrap();
//!
//! assert!(outcome.trades.is_empty());
//! assert_eq!(outcome.residual_sells.len(), 2);
//! ```
//!
//! ## Feature flags
//!
//! | Feature | Adds |
//! |---------|------|
//! | `serde` | `Serialize`/`Deserialize` on public data types |
//! | `persistence` | JSON basket snapshots and JSONL trade files |
//! | `parallel` | [`batch`]: rayon-parallel trade computation over many baskets |

pub mod arena;
mod basket;
#[cfg(feature = "parallel")]
pub mod batch;
mod error;
mod imbalance;
pub mod matcher;
#[cfg(feature = "persistence")]
pub mod persistence;
mod prices;
mod trade;
mod types;

pub use basket::Basket;
pub use error::{Error, Result};
pub use imbalance::{Imbalance, ImbalanceSide, Imbalances};
pub use matcher::{MatchConfig, MatchOutcome, TradeMatcher};
pub use prices::{PriceFn, PriceMap, PriceSource};
pub use trade::Trade;
pub use types::{AssetId, Quantity, Value};
