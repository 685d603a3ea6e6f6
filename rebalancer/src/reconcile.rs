//! Post-settlement reconciliation: compare holdings vs target weights.

use basketbook::{Basket, PriceSource, Quantity};
use serde::Serialize;

use crate::error::Result;

/// Reconciliation report comparing actual vs target.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub total_value: f64,
    pub entries: Vec<ReconcileEntry>,
    pub tracking_error_pct: f64,
}

/// One asset's reconciliation entry.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileEntry {
    pub asset: String,
    pub target_weight: f64,
    pub actual_weight: f64,
    pub diff_weight: f64,
    pub target_quantity: Quantity,
    pub actual_quantity: Quantity,
}

/// Compare a basket's holdings against its target weights.
///
/// Entries follow the basket's eligible order. Tracking error is the RMS of
/// the per-asset weight gaps, in percent.
pub fn reconcile(basket: &Basket, prices: &impl PriceSource) -> Result<ReconcileReport> {
    let total_value = basket.total_value(prices)?;
    let weights = basket.current_weights(prices)?;

    let mut entries = Vec::with_capacity(basket.eligible_assets().len());
    let mut sum_sq_diff = 0.0_f64;

    for asset in basket.eligible_assets() {
        let price = prices.require(asset)?;
        let target_weight = basket.target_weight(asset);
        let actual_weight = weights
            .iter()
            .find(|(a, _)| a == asset)
            .map_or(0.0, |(_, w)| *w);

        let diff_weight = actual_weight - target_weight;
        sum_sq_diff += diff_weight * diff_weight;

        entries.push(ReconcileEntry {
            asset: asset.to_string(),
            target_weight,
            actual_weight,
            diff_weight,
            target_quantity: total_value * target_weight / price,
            actual_quantity: basket.holding(asset),
        });
    }

    let tracking_error_pct = (sum_sq_diff / entries.len().max(1) as f64).sqrt() * 100.0;

    Ok(ReconcileReport {
        total_value,
        entries,
        tracking_error_pct,
    })
}

impl std::fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "RECONCILIATION (total value {:.4}):", self.total_value)?;
        writeln!(
            f,
            "  {:8} {:>10} {:>10} {:>10} {:>12} {:>12}",
            "Asset", "Target%", "Actual%", "Diff%", "TargetQty", "ActualQty"
        )?;
        for e in &self.entries {
            writeln!(
                f,
                "  {:8} {:>9.2}% {:>9.2}% {:>+9.2}% {:>12.4} {:>12.4}",
                e.asset,
                e.target_weight * 100.0,
                e.actual_weight * 100.0,
                e.diff_weight * 100.0,
                e.target_quantity,
                e.actual_quantity,
            )?;
        }
        writeln!(f, "\n  Tracking error: {:.3}%", self.tracking_error_pct)?;
        Ok(())
    }
}
