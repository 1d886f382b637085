use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::DashboardConfig;
use crate::market::Symbol;
use crate::metrics::{MetricKind, RiskMetricsRecord};

/// Outcome of a run for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SymbolMetrics {
    Available { records: Vec<RiskMetricsRecord> },
    /// Prices could not be obtained or were malformed; no records are produced.
    Unavailable { reason: String },
}

impl SymbolMetrics {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        SymbolMetrics::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SymbolMetrics::Available { .. })
    }

    pub fn records(&self) -> Option<&[RiskMetricsRecord]> {
        match self {
            SymbolMetrics::Available { records } => Some(records),
            SymbolMetrics::Unavailable { .. } => None,
        }
    }
}

/// Per-symbol results of one run, keyed by symbol. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDataset {
    generated_at: DateTime<Utc>,
    config: DashboardConfig,
    entries: BTreeMap<Symbol, SymbolMetrics>,
}

impl SymbolDataset {
    pub fn new(config: DashboardConfig, entries: BTreeMap<Symbol, SymbolMetrics>) -> Self {
        Self {
            generated_at: Utc::now(),
            config,
            entries,
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&SymbolMetrics> {
        self.entries.get(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &SymbolMetrics)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn available_count(&self) -> usize {
        self.entries.values().filter(|m| m.is_available()).count()
    }

    /// Time series of one indicator for one symbol, with gaps kept as `None`.
    ///
    /// Returns `None` when the symbol is unknown or unavailable.
    pub fn series(
        &self,
        symbol: &Symbol,
        kind: MetricKind,
    ) -> Option<Vec<(DateTime<Utc>, Option<f64>)>> {
        let records = self.entries.get(symbol)?.records()?;
        Some(records.iter().map(|r| (r.timestamp, r.value(kind))).collect())
    }
}
