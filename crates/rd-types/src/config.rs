//! Run configuration.
//!
//! [`MetricsConfig`] parameterizes the per-symbol engine; [`DashboardConfig`]
//! adds the symbol list and the fetch request sent to the market data provider.
//! Both deserialize from a single flat JSON object.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config_error;
use crate::errors::{MetricsError, RdResult};
use crate::market::{Resolution, Symbol};

/// Trading days per year.
pub const DEFAULT_ANNUALIZATION_FACTOR: f64 = 252.0;

/// Parameters of the risk metrics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub volatility_window: usize,
    pub sharpe_window: usize,
    pub var_window: usize,
    /// VaR confidence, e.g. 0.95 selects the 5th percentile of returns.
    pub confidence_level: f64,
    /// Return periods per year.
    pub annualization_factor: f64,
    /// Per-period risk-free rate subtracted from the mean return.
    pub risk_free_rate: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            volatility_window: 30,
            sharpe_window: 60,
            var_window: 30,
            confidence_level: 0.95,
            annualization_factor: DEFAULT_ANNUALIZATION_FACTOR,
            risk_free_rate: 0.0,
        }
    }
}

impl MetricsConfig {
    pub fn with_windows(mut self, volatility: usize, sharpe: usize, var: usize) -> Self {
        self.volatility_window = volatility;
        self.sharpe_window = sharpe;
        self.var_window = var;
        self
    }

    pub fn with_confidence(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    /// Lower-tail probability used for VaR and CVaR.
    pub fn tail_probability(&self) -> f64 {
        1.0 - self.confidence_level
    }

    pub fn validate(&self) -> Result<(), MetricsError> {
        for (name, window) in [
            ("volatility_window", self.volatility_window),
            ("sharpe_window", self.sharpe_window),
            ("var_window", self.var_window),
        ] {
            if window < 2 {
                return Err(MetricsError::InvalidConfig {
                    message: format!("{} must be at least 2, got {}", name, window),
                });
            }
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(MetricsError::InvalidConfig {
                message: format!(
                    "confidence_level must lie strictly between 0 and 1, got {}",
                    self.confidence_level
                ),
            });
        }
        if !(self.annualization_factor.is_finite() && self.annualization_factor > 0.0) {
            return Err(MetricsError::InvalidConfig {
                message: format!(
                    "annualization_factor must be positive, got {}",
                    self.annualization_factor
                ),
            });
        }
        if !self.risk_free_rate.is_finite() {
            return Err(MetricsError::InvalidConfig {
                message: "risk_free_rate must be finite".to_string(),
            });
        }
        Ok(())
    }
}

/// Upper bound on `bars_requested`.
pub const MAX_BARS_REQUESTED: usize = 100_000;

/// Full configuration of a multi-symbol run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub symbols: Vec<Symbol>,
    pub resolution: Resolution,
    /// Number of most recent bars requested per symbol.
    pub bars_requested: usize,
    pub fetch_timeout_secs: u64,
    #[serde(flatten)]
    pub metrics: MetricsConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            symbols: ["EURUSD", "USDJPY", "GBPUSD", "XAUUSD"]
                .into_iter()
                .map(Symbol::new)
                .collect(),
            resolution: Resolution::Day,
            bars_requested: 500,
            fetch_timeout_secs: 30,
            metrics: MetricsConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn with_symbols(mut self, symbols: Vec<Symbol>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_bars(mut self, bars_requested: usize) -> Self {
        self.bars_requested = bars_requested;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RdResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: DashboardConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RdResult<()> {
        if self.symbols.is_empty() {
            return Err(config_error!("at least one symbol is required"));
        }
        if !(2..=MAX_BARS_REQUESTED).contains(&self.bars_requested) {
            return Err(config_error!(
                "bars_requested must be between 2 and {}, got {}",
                MAX_BARS_REQUESTED,
                self.bars_requested
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(config_error!("fetch_timeout_secs must be positive"));
        }
        self.metrics
            .validate()
            .map_err(|e| config_error!("{}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RdError;

    #[test]
    fn test_defaults_validate() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.symbols.len(), 4);
        assert_eq!(config.metrics.annualization_factor, 252.0);
        assert!((config.metrics.tail_probability() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_flat_json_with_partial_fields() {
        let json = r#"{
            "symbols": ["EURUSD", "XAUUSD"],
            "resolution": "Hour",
            "bars_requested": 250,
            "var_window": 20,
            "confidence_level": 0.99
        }"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.symbols, vec![Symbol::new("EURUSD"), Symbol::new("XAUUSD")]);
        assert_eq!(config.resolution, Resolution::Hour);
        assert_eq!(config.metrics.var_window, 20);
        assert_eq!(config.metrics.volatility_window, 30);
        assert_eq!(config.metrics.confidence_level, 0.99);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_small_window() {
        let metrics = MetricsConfig::default().with_windows(1, 60, 30);
        assert!(matches!(
            metrics.validate(),
            Err(MetricsError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_rejects_confidence_out_of_range() {
        assert!(MetricsConfig::default().with_confidence(1.0).validate().is_err());
        assert!(MetricsConfig::default().with_confidence(0.0).validate().is_err());
        assert!(MetricsConfig::default().with_confidence(0.9).validate().is_ok());
    }

    #[test]
    fn test_bars_requested_bounds() {
        assert!(DashboardConfig::default().with_bars(1).validate().is_err());
        assert!(DashboardConfig::default().with_bars(MAX_BARS_REQUESTED).validate().is_ok());
        assert!(matches!(
            DashboardConfig::default().with_bars(MAX_BARS_REQUESTED + 1).validate(),
            Err(RdError::Config(_))
        ));
        assert!(DashboardConfig::default().with_bars(usize::MAX).validate().is_err());
    }

    #[test]
    fn test_rejects_empty_symbols() {
        let config = DashboardConfig::default().with_symbols(Vec::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("riskdeck.json");
        std::fs::write(&path, r#"{"symbols": ["GBPUSD"], "sharpe_window": 20}"#).unwrap();

        let config = DashboardConfig::from_json_file(&path).unwrap();
        assert_eq!(config.symbols, vec![Symbol::new("GBPUSD")]);
        assert_eq!(config.metrics.sharpe_window, 20);

        std::fs::write(&path, r#"{"symbols": ["GBPUSD"], "var_window": 1}"#).unwrap();
        assert!(DashboardConfig::from_json_file(&path).is_err());
    }
}
