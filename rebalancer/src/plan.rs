//! Planning orchestrator: value → check → imbalances → match → reconcile.
//!
//! This is the main workflow that ties together all components. Nothing is
//! executed against a venue; the computed trades are settled against a copy
//! of the basket to show where they leave it.

use std::path::PathBuf;

use basketbook::{Basket, MatchOutcome, PriceSource};
use log::{debug, info, warn};

use crate::audit::{self, AuditLog};
use crate::checks;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::reconcile::{self, ReconcileReport};

/// Tolerance for the per-trade value conservation check.
const CONSERVATION_TOLERANCE: f64 = 1e-9;

/// Options for a planning run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Where the prices came from, for the audit trail
    pub price_source: String,
    /// Write the trades here as JSON Lines
    pub trades_out: Option<PathBuf>,
}

/// What a planning run produced.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub outcome: MatchOutcome,
    /// Basket after settling every trade
    pub settled: Basket,
    pub reconcile: ReconcileReport,
}

/// Compute the trades that rebalance the configured basket.
pub fn run(config: &Config, prices: &impl PriceSource, opts: &RunOptions) -> Result<PlanOutcome> {
    let basket = config.to_basket()?;

    let mut audit = AuditLog::open(&config.audit_path())?;
    audit::log_run_started(&mut audit, basket.name(), &opts.price_source)?;

    // 1. Pre-trade checks
    let report = checks::pre_trade_checks(&basket, prices, &config.checks);
    print!("{report}");
    audit::log_checks(&mut audit, &report)?;

    if report.has_failures() {
        return Err(Error::CheckFailed(format!(
            "{} (aborting)",
            report.failure_summary()
        )));
    }

    // 2. Current state
    display_holdings(&basket, prices)?;

    // 3. Imbalances
    let imbalances = basket.imbalances(prices)?;
    audit::log_imbalances(&mut audit, &imbalances)?;
    for imb in imbalances.sells.iter().chain(&imbalances.buys) {
        debug!("Imbalance: {imb}");
    }

    if imbalances.is_balanced() {
        println!("\nNo rebalancing needed: basket matches target.");
        audit.log_simple("no_rebalance_needed")?;
    }

    // 4. Match
    let matcher = config.matcher();
    let outcome = matcher.run(imbalances.sells, imbalances.buys, prices)?;
    audit::log_match(&mut audit, &outcome)?;
    for trade in &outcome.trades {
        debug!("Matched: {trade}");
    }
    display_trades(&outcome);

    let mut post = checks::CheckReport::default();
    post.push(checks::check_residual(&outcome, &config.checks));
    post.push(checks::check_value_conservation(
        &outcome.trades,
        prices,
        CONSERVATION_TOLERANCE * imbalances.total_value.max(1.0),
    ));
    print!("\n{post}");
    audit::log_checks(&mut audit, &post)?;
    if post.has_warnings() {
        warn!("Post-match checks raised warnings; see report above");
    }

    if let Some(path) = &opts.trades_out {
        if let Err(e) = basketbook::persistence::save_trades(&outcome.trades, path) {
            audit.log(
                "trades_write_failed",
                serde_json::json!({
                    "path": path.display().to_string(),
                    "error": e.to_string(),
                }),
            )?;
            return Err(Error::TradesWrite {
                path: path.clone(),
                source: e,
            });
        }
        info!("Wrote {} trades to {}", outcome.trades.len(), path.display());
    }

    // 5. Settle a copy and reconcile
    let mut settled = basket.clone();
    settled.settle(&outcome.trades)?;
    let reconcile = reconcile::reconcile(&settled, prices)?;
    print!("\n{reconcile}");

    audit::log_run_completed(&mut audit, outcome.trades.len(), reconcile.tracking_error_pct)?;
    info!("Audit logged to {}", config.audit_path().display());

    Ok(PlanOutcome {
        outcome,
        settled,
        reconcile,
    })
}

/// Print the basket's holdings and how far each asset sits from target.
pub fn show_value(config: &Config, prices: &impl PriceSource) -> Result<()> {
    let basket = config.to_basket()?;
    display_holdings(&basket, prices)?;
    let report = reconcile::reconcile(&basket, prices)?;
    print!("\n{report}");
    Ok(())
}

// === Helpers ===

fn display_holdings(basket: &Basket, prices: &impl PriceSource) -> Result<()> {
    let total = basket.total_value(prices)?;
    println!("\n{basket}: total value {total:.4}");

    for asset in basket.eligible_assets() {
        let qty = basket.holding(asset);
        let price = prices.require(asset)?;
        let value = qty * price;
        let weight = if total > 0.0 { value / total } else { 0.0 };
        println!(
            "  {:8} {:>12.4} @ {:>8.4} = {:>12.4}  ({:.1}% / target {:.1}%)",
            asset,
            qty,
            price,
            value,
            weight * 100.0,
            basket.target_weight(asset) * 100.0,
        );
    }
    Ok(())
}

fn display_trades(outcome: &MatchOutcome) {
    if outcome.trades.is_empty() {
        println!("\nNo trades.");
        return;
    }

    println!("\nTRADES:");
    for (i, trade) in outcome.trades.iter().enumerate() {
        println!("  {:>3}  {trade}", i + 1);
    }
    println!("  Traded value: {:.4}", outcome.traded_value());

    for imb in outcome.residual_sells.iter().chain(&outcome.residual_buys) {
        println!("  Unmatched: {imb}");
    }
}
