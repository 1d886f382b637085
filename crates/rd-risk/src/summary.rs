//! Point-in-time digest of a metrics table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rd_types::RiskMetricsRecord;

/// Latest state of each indicator plus the worst drawdown seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub as_of: DateTime<Utc>,
    pub observations: usize,
    pub total_return: f64,
    /// Most negative drawdown over the whole table.
    pub max_drawdown: f64,
    pub current_drawdown: f64,
    // Latest defined value of each rolling indicator.
    pub volatility: Option<f64>,
    pub sharpe: Option<f64>,
    pub value_at_risk: Option<f64>,
    pub conditional_value_at_risk: Option<f64>,
}

impl RiskSummary {
    pub fn from_records(records: &[RiskMetricsRecord]) -> Option<Self> {
        let last = records.last()?;

        Some(Self {
            as_of: last.timestamp,
            observations: records.len(),
            total_return: last.cumulative_return,
            max_drawdown: records.iter().map(|r| r.drawdown).fold(0.0, f64::min),
            current_drawdown: last.drawdown,
            volatility: latest(records, |r| r.rolling_volatility),
            sharpe: latest(records, |r| r.rolling_sharpe),
            value_at_risk: latest(records, |r| r.value_at_risk),
            conditional_value_at_risk: latest(records, |r| r.conditional_value_at_risk),
        })
    }
}

fn latest<F>(records: &[RiskMetricsRecord], f: F) -> Option<f64>
where
    F: Fn(&RiskMetricsRecord) -> Option<f64>,
{
    records.iter().rev().find_map(f)
}
