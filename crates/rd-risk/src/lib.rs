//! Risk metrics engine for RiskDeck.
//!
//! Provides:
//! - Simple period returns with input validation
//! - Fixed-window rolling mean, standard deviation, quantile and tail mean
//! - Per-symbol metrics tables (volatility, Sharpe, VaR, CVaR, drawdown)
//! - A point-in-time summary of a finished table

pub mod metrics;
pub mod returns;
pub mod rolling;
pub mod summary;

pub use metrics::RiskMetricsCalculator;
pub use returns::{simple_returns, validate_prices};
pub use summary::RiskSummary;
