// Per-symbol fan-out of the risk metrics engine.

use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use rd_risk::RiskMetricsCalculator;
use rd_types::{DashboardConfig, PriceSeries, RdResult, Symbol, SymbolDataset, SymbolMetrics};

/// Result of fetching one symbol's prices.
pub type FetchOutcome = (Symbol, RdResult<PriceSeries>);

/// Compute metrics for every fetched symbol and assemble the dataset.
///
/// Symbols are processed independently on the rayon pool. Every symbol in
/// `config.symbols` gets exactly one entry: a failed fetch, a malformed series,
/// or a symbol with no outcome at all is recorded as unavailable.
pub fn build_dataset(config: &DashboardConfig, fetched: Vec<FetchOutcome>) -> SymbolDataset {
    let metrics_config = &config.metrics;

    let mut entries: BTreeMap<Symbol, SymbolMetrics> = fetched
        .into_par_iter()
        .map(|(symbol, outcome)| {
            let metrics = match outcome {
                Ok(series) => match RiskMetricsCalculator::compute(&series, metrics_config) {
                    Ok(records) => {
                        debug!("{}: {} records", symbol, records.len());
                        SymbolMetrics::Available { records }
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", symbol, e);
                        SymbolMetrics::unavailable(e.to_string())
                    }
                },
                Err(e) => {
                    warn!("Failed to get prices for {}: {}", symbol, e);
                    SymbolMetrics::unavailable(e.to_string())
                }
            };
            (symbol, metrics)
        })
        .collect();

    for symbol in &config.symbols {
        entries
            .entry(symbol.clone())
            .or_insert_with(|| SymbolMetrics::unavailable("no data was fetched"));
    }
    entries.retain(|symbol, _| config.symbols.contains(symbol));

    SymbolDataset::new(config.clone(), entries)
}
