//! basketbook-rebalancer: command-line harness around the basketbook core.
//!
//! Reads a basket definition and holdings from a TOML config, prices from a
//! JSON snapshot (or a seeded mock oracle), computes the rebalancing trades,
//! runs pre-trade checks, and records every run in a JSONL audit trail.

pub mod audit;
pub mod checks;
pub mod config;
pub mod error;
pub mod oracle;
pub mod plan;
pub mod prices;
pub mod reconcile;
