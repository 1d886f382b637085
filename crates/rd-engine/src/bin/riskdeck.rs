use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rd_data::DataSourceConfig;
use rd_engine::RiskEngine;
use rd_risk::RiskSummary;
use rd_types::{DashboardConfig, Symbol, SymbolMetrics};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Compute rolling risk metrics for a set of symbols and emit them as JSON.
#[derive(Debug, Parser)]
#[command(name = "riskdeck", version)]
struct Args {
    /// JSON configuration file; falls back to $RISKDECK_CONFIG, then defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read `{symbol}_{resolution}.csv` files from this directory instead of
    /// generating sample prices.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Comma-separated symbols overriding the configured list.
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,

    /// Write the dataset here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    pretty: bool,
}

fn load_config(args: &Args) -> anyhow::Result<DashboardConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var("RISKDECK_CONFIG").ok().map(PathBuf::from));

    let mut config = match path {
        Some(path) => DashboardConfig::from_json_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if !args.symbols.is_empty() {
        config.symbols = args.symbols.iter().map(|s| Symbol::new(s.trim())).collect();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let source = match &args.data_dir {
        Some(dir) => DataSourceConfig::csv(dir),
        None => DataSourceConfig::default(),
    };

    let engine = RiskEngine::new(config, source.build())?;
    let dataset = engine.run().await?;

    for (symbol, metrics) in dataset.iter() {
        match metrics {
            SymbolMetrics::Available { records } => match RiskSummary::from_records(records) {
                Some(s) => info!(
                    "{}: return {:.2}%, max drawdown {:.2}%, vol {:?}, sharpe {:?}, VaR {:?}, CVaR {:?}",
                    symbol,
                    s.total_return * 100.0,
                    s.max_drawdown * 100.0,
                    s.volatility,
                    s.sharpe,
                    s.value_at_risk,
                    s.conditional_value_at_risk
                ),
                None => info!("{}: not enough prices for metrics", symbol),
            },
            SymbolMetrics::Unavailable { reason } => warn!("{}: unavailable ({})", symbol, reason),
        }
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&dataset)?
    } else {
        serde_json::to_string(&dataset)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote dataset to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
