//! Risk metrics computation.
//!
//! [`RiskMetricsCalculator`] turns one validated price series into a sequence of
//! [`RiskMetricsRecord`]s, one per return timestamp.

use rd_types::{MetricsConfig, MetricsError, PriceSeries, RiskMetricsRecord};
use tracing::debug;

use crate::returns::simple_returns;
use crate::rolling::{rolling_mean, rolling_std, rolling_tail_risk};

/// Stateless calculator for per-symbol risk metrics.
pub struct RiskMetricsCalculator;

impl RiskMetricsCalculator {
    /// Compute the full metrics table for `series`.
    ///
    /// A series with a single price yields an empty table. Malformed prices
    /// fail the whole series with [`MetricsError::InvalidInput`].
    pub fn compute(
        series: &PriceSeries,
        config: &MetricsConfig,
    ) -> Result<Vec<RiskMetricsRecord>, MetricsError> {
        config.validate()?;

        let returns = simple_returns(series)?;
        if returns.is_empty() {
            debug!("{}: fewer than two prices, no metrics", series.symbol);
            return Ok(Vec::new());
        }
        let values: Vec<f64> = returns.iter().map(|r| r.value).collect();

        let annualization = config.annualization_factor.sqrt();
        let volatility = rolling_std(&values, config.volatility_window)?;
        let sharpe_mean = rolling_mean(&values, config.sharpe_window)?;
        let sharpe_std = rolling_std(&values, config.sharpe_window)?;
        let tail_risk = rolling_tail_risk(&values, config.var_window, config.tail_probability())?;

        let mut records = Vec::with_capacity(returns.len());
        let mut growth = 1.0;
        let mut cumulative_max = f64::NEG_INFINITY;

        for (i, ret) in returns.iter().enumerate() {
            growth *= 1.0 + ret.value;
            let cumulative_return = growth - 1.0;
            cumulative_max = cumulative_max.max(cumulative_return);

            // A zero-dispersion window leaves the Sharpe ratio undefined.
            let rolling_sharpe = match (sharpe_mean[i], sharpe_std[i]) {
                (Some(mean), Some(std)) if std > 0.0 => {
                    Some((mean - config.risk_free_rate) / std * annualization)
                }
                _ => None,
            };

            records.push(RiskMetricsRecord {
                timestamp: ret.timestamp,
                daily_return: ret.value,
                cumulative_return,
                cumulative_max,
                drawdown: cumulative_return - cumulative_max,
                rolling_volatility: volatility[i].map(|std| std * annualization),
                rolling_sharpe,
                value_at_risk: tail_risk[i].map(|(var, _)| var),
                conditional_value_at_risk: tail_risk[i].map(|(_, cvar)| cvar),
            });
        }

        debug!("{}: computed {} metric rows", series.symbol, records.len());
        Ok(records)
    }
}
