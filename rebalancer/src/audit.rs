//! JSONL audit trail logging.
//!
//! Each rebalancer run appends events to an audit.jsonl file,
//! one JSON object per line.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use basketbook::{Imbalances, MatchOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::checks::CheckReport;
use crate::error::Result;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Log a simple event with no additional data.
    pub fn log_simple(&mut self, event: &'static str) -> Result<()> {
        self.log(event, serde_json::json!({}))
    }
}

/// Convenience: log a run start event.
pub fn log_run_started(audit: &mut AuditLog, basket: &str, price_source: &str) -> Result<()> {
    audit.log(
        "run_started",
        serde_json::json!({
            "basket": basket,
            "prices": price_source,
        }),
    )
}

/// Convenience: log computed imbalances.
pub fn log_imbalances(audit: &mut AuditLog, imbalances: &Imbalances) -> Result<()> {
    let records: Vec<_> = imbalances
        .sells
        .iter()
        .chain(&imbalances.buys)
        .map(|i| {
            serde_json::json!({
                "asset": i.asset.as_str(),
                "side": i.side.to_string(),
                "qty": i.quantity,
                "value": i.value,
            })
        })
        .collect();

    audit.log(
        "imbalances_computed",
        serde_json::json!({
            "total_value": imbalances.total_value,
            "imbalances": records,
        }),
    )
}

/// Convenience: log check results.
pub fn log_checks(audit: &mut AuditLog, report: &CheckReport) -> Result<()> {
    let check_data: Vec<_> = report
        .checks
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.name,
                "status": c.status.to_string(),
                "detail": c.detail,
            })
        })
        .collect();

    audit.log(
        "checks",
        serde_json::json!({
            "passed": !report.has_failures(),
            "checks": check_data,
        }),
    )
}

/// Convenience: log the matched trades and any residual.
pub fn log_match(audit: &mut AuditLog, outcome: &MatchOutcome) -> Result<()> {
    let trade_data: Vec<_> = outcome
        .trades
        .iter()
        .map(|t| {
            serde_json::json!({
                "sell": t.sell_asset.as_str(),
                "buy": t.buy_asset.as_str(),
                "sell_qty": t.sell_quantity,
                "buy_qty": t.buy_quantity,
                "value": t.value,
            })
        })
        .collect();

    audit.log(
        "trades_matched",
        serde_json::json!({
            "trades": trade_data,
            "traded_value": outcome.traded_value(),
            "residual_sell_value": outcome.residual_sell_value(),
            "residual_buy_value": outcome.residual_buy_value(),
        }),
    )
}

/// Convenience: log run completion.
pub fn log_run_completed(
    audit: &mut AuditLog,
    trades: usize,
    tracking_error_pct: f64,
) -> Result<()> {
    audit.log(
        "run_completed",
        serde_json::json!({
            "trades": trades,
            "tracking_error_pct": tracking_error_pct,
        }),
    )
}
