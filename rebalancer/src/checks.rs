//! Pre-trade and post-match checks.
//!
//! Surfaces conditions the core library tolerates silently: target weights
//! that do not sum to 1.0, unpriced assets, and imbalance left unmatched.

use basketbook::{Basket, MatchOutcome, PriceSource, Trade};
use serde::Serialize;

use crate::config::ChecksConfig;

/// Result of running a set of checks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub checks: Vec<Check>,
}

/// A single check result.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

/// Whether a check passed, warned, or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "PASS"),
            CheckStatus::Warn => write!(f, "WARN"),
            CheckStatus::Fail => write!(f, "FAIL"),
        }
    }
}

impl CheckReport {
    /// True if any check failed (not just warned).
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    /// True if any check warned.
    pub fn has_warnings(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Warn)
    }

    /// Names of failed checks, comma-separated.
    pub fn failure_summary(&self) -> String {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn push(&mut self, check: Check) {
        self.checks.push(check);
    }
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "CHECKS:")?;
        for check in &self.checks {
            writeln!(f, "  [{}] {}: {}", check.status, check.name, check.detail)?;
        }
        Ok(())
    }
}

/// Checks that can run before any trade is computed.
pub fn pre_trade_checks(
    basket: &Basket,
    prices: &impl PriceSource,
    config: &ChecksConfig,
) -> CheckReport {
    let mut report = CheckReport::default();
    report.push(check_weight_sum(basket, config));
    report.push(check_price_coverage(basket, prices));
    report
}

/// Target weights should sum to 1.0.
///
/// The library does not enforce this; skewed weights make every asset look
/// over- or underweight and leave residual imbalance behind.
pub fn check_weight_sum(basket: &Basket, config: &ChecksConfig) -> Check {
    let sum = basket.weight_sum();
    let ok = (sum - 1.0).abs() <= config.weight_tolerance;
    let status = match (ok, config.fail_on_weight_drift) {
        (true, _) => CheckStatus::Pass,
        (false, true) => CheckStatus::Fail,
        (false, false) => CheckStatus::Warn,
    };
    Check {
        name: "Weight sum",
        status,
        detail: format!(
            "{:.6} {} 1.0 ± {:e}",
            sum,
            if ok { "within" } else { "outside" },
            config.weight_tolerance,
        ),
    }
}

/// Every eligible asset needs a price, held or not.
pub fn check_price_coverage(basket: &Basket, prices: &impl PriceSource) -> Check {
    let missing: Vec<&str> = basket
        .eligible_assets()
        .iter()
        .filter(|a| prices.price(a).is_none())
        .map(|a| a.as_str())
        .collect();

    if missing.is_empty() {
        Check {
            name: "Price coverage",
            status: CheckStatus::Pass,
            detail: format!("{} assets priced", basket.eligible_assets().len()),
        }
    } else {
        Check {
            name: "Price coverage",
            status: CheckStatus::Fail,
            detail: format!("missing: {}", missing.join(", ")),
        }
    }
}

/// Imbalance the matcher could not pair.
///
/// Never fails the run: the trades already emitted are still valid.
pub fn check_residual(outcome: &MatchOutcome, config: &ChecksConfig) -> Check {
    let residual = outcome
        .residual_sell_value()
        .max(outcome.residual_buy_value());
    let status = if residual <= config.max_residual_value {
        CheckStatus::Pass
    } else {
        CheckStatus::Warn
    };
    Check {
        name: "Residual imbalance",
        status,
        detail: format!(
            "{:.6} unmatched ({} sell, {} buy records) {} {} limit",
            residual,
            outcome.residual_sells.len(),
            outcome.residual_buys.len(),
            if status == CheckStatus::Pass { "<=" } else { ">" },
            config.max_residual_value,
        ),
    }
}

/// Both legs of every trade should be worth the trade value.
pub fn check_value_conservation(
    trades: &[Trade],
    prices: &impl PriceSource,
    tolerance: f64,
) -> Check {
    let mut worst = 0.0_f64;
    for t in trades {
        let legs = [t.sell_notional(prices), t.buy_notional(prices)];
        for leg in legs {
            let gap = match leg {
                Ok(v) => (v - t.value).abs(),
                Err(_) => f64::INFINITY,
            };
            worst = worst.max(gap);
        }
    }
    let status = if worst <= tolerance {
        CheckStatus::Pass
    } else {
        CheckStatus::Warn
    };
    Check {
        name: "Value conservation",
        status,
        detail: format!("max leg gap {worst:e} over {} trades", trades.len()),
    }
}
