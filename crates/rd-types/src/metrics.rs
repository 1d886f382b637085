use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simple period return aligned to the later of the two prices it spans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// One row of risk indicators per return timestamp.
///
/// Rolling metrics are `None` until their trailing window is full, or when the
/// window is degenerate (zero dispersion). `None` serializes as `null` and is a
/// distinct signal from a zero value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetricsRecord {
    pub timestamp: DateTime<Utc>,
    pub daily_return: f64,
    /// Compounded return since the first price, `prod(1 + r) - 1`.
    pub cumulative_return: f64,
    /// Running maximum of `cumulative_return`, including this row.
    pub cumulative_max: f64,
    /// `cumulative_return - cumulative_max`; never positive.
    pub drawdown: f64,
    pub rolling_volatility: Option<f64>,
    pub rolling_sharpe: Option<f64>,
    pub value_at_risk: Option<f64>,
    pub conditional_value_at_risk: Option<f64>,
}

impl RiskMetricsRecord {
    pub fn value(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::CumulativeReturn => Some(self.cumulative_return),
            MetricKind::Drawdown => Some(self.drawdown),
            MetricKind::RollingVolatility => self.rolling_volatility,
            MetricKind::RollingSharpe => self.rolling_sharpe,
            MetricKind::ValueAtRisk => self.value_at_risk,
            MetricKind::ConditionalValueAtRisk => self.conditional_value_at_risk,
        }
    }
}

/// The indicator series a renderer can plot for each symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    CumulativeReturn,
    Drawdown,
    RollingVolatility,
    RollingSharpe,
    ValueAtRisk,
    ConditionalValueAtRisk,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::CumulativeReturn,
        MetricKind::Drawdown,
        MetricKind::RollingVolatility,
        MetricKind::RollingSharpe,
        MetricKind::ValueAtRisk,
        MetricKind::ConditionalValueAtRisk,
    ];

    /// Whether the series depends on a trailing window and may contain gaps.
    pub fn is_windowed(&self) -> bool {
        !matches!(self, MetricKind::CumulativeReturn | MetricKind::Drawdown)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetricKind::CumulativeReturn => "cumulative_return",
            MetricKind::Drawdown => "drawdown",
            MetricKind::RollingVolatility => "rolling_volatility",
            MetricKind::RollingSharpe => "rolling_sharpe",
            MetricKind::ValueAtRisk => "value_at_risk",
            MetricKind::ConditionalValueAtRisk => "conditional_value_at_risk",
        };
        write!(f, "{}", s)
    }
}
