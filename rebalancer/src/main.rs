//! CLI entry point for the basketbook rebalancer.

use std::path::{Path, PathBuf};
use std::process;

use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;

use basketbook_rebalancer::config::Config;
use basketbook_rebalancer::error::{Error, Result};
use basketbook_rebalancer::oracle::{self, MockOracle};
use basketbook_rebalancer::plan::{self, RunOptions};
use basketbook_rebalancer::prices::PriceSnapshot;

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Basket rebalancer: target weights → two-sided trades")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute imbalances and matched trades from a price snapshot
    Plan {
        /// Path to prices.json
        prices: PathBuf,

        /// Write trades as JSON Lines to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Plan against randomly generated prices
    Demo {
        /// Seed for reproducible prices
        #[arg(long)]
        seed: Option<u64>,

        /// Lowest generated price
        #[arg(long, default_value_t = oracle::DEFAULT_RANGE.0)]
        low: f64,

        /// Highest generated price (exclusive)
        #[arg(long, default_value_t = oracle::DEFAULT_RANGE.1)]
        high: f64,

        /// Save the generated prices as a snapshot
        #[arg(long)]
        save_prices: Option<PathBuf>,

        /// Write trades as JSON Lines to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show holdings, value, and drift from target
    Value {
        /// Path to prices.json
        prices: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Plan { prices, out } => load_config(&cli.config, false).and_then(|config| {
            let snapshot = PriceSnapshot::load(&prices)?;
            let opts = RunOptions {
                price_source: prices.display().to_string(),
                trades_out: out,
            };
            plan::run(&config, &snapshot.to_price_map(), &opts).map(|_| ())
        }),
        Command::Demo {
            seed,
            low,
            high,
            save_prices,
            out,
        } => load_config(&cli.config, true).and_then(|config| {
            let mut oracle = MockOracle::new(low, high, seed)?;
            let assets = config.to_basket()?.eligible_assets().to_vec();
            let prices = oracle.quote(&assets);

            if let Some(path) = &save_prices {
                PriceSnapshot::from_price_map(&prices, Utc::now()).save(path)?;
                info!("Saved generated prices to {}", path.display());
            }

            let opts = RunOptions {
                price_source: match seed {
                    Some(s) => format!("mock oracle (seed {s})"),
                    None => "mock oracle".into(),
                },
                trades_out: out,
            };
            plan::run(&config, &prices, &opts).map(|_| ())
        }),
        Command::Value { prices } => load_config(&cli.config, false).and_then(|config| {
            let snapshot = PriceSnapshot::load(&prices)?;
            plan::show_value(&config, &snapshot.to_price_map())
        }),
    };

    if let Err(e) = result {
        match &e {
            Error::CheckFailed(msg) => {
                eprintln!("\nAborted: {msg}");
                process::exit(2);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}

/// Load the config file, falling back to the built-in demo basket when
/// `demo_fallback` is set and the file does not exist.
fn load_config(path: &Path, demo_fallback: bool) -> Result<Config> {
    if demo_fallback && !path.exists() {
        info!("{} not found, using demo basket", path.display());
        return Ok(Config::demo());
    }
    Config::load(path)
}
