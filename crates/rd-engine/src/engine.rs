// Multi-symbol risk run: concurrent fetch, parallel compute.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rd_data::MarketDataProvider;
use rd_types::{internal_error, DashboardConfig, DataError, RdResult, Symbol, SymbolDataset};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::dataset::{build_dataset, FetchOutcome};

/// Runs the risk metrics engine over every configured symbol.
pub struct RiskEngine {
    config: DashboardConfig,
    provider: Arc<dyn MarketDataProvider>,
}

impl RiskEngine {
    /// Create an engine; the configuration is validated up front.
    pub fn new(config: DashboardConfig, provider: Arc<dyn MarketDataProvider>) -> RdResult<Self> {
        config.validate()?;
        Ok(Self { config, provider })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Requested symbols in order, duplicates removed.
    fn unique_symbols(&self) -> Vec<Symbol> {
        let mut seen = HashSet::new();
        self.config
            .symbols
            .iter()
            .filter(|s| seen.insert(*s))
            .cloned()
            .collect()
    }

    /// Fetch prices for every symbol concurrently, each bounded by the fetch timeout.
    pub async fn fetch_all(&self) -> Vec<FetchOutcome> {
        let timeout = Duration::from_secs(self.config.fetch_timeout_secs);
        let mut tasks = JoinSet::new();

        for symbol in self.unique_symbols() {
            let provider = Arc::clone(&self.provider);
            let resolution = self.config.resolution;
            let count = self.config.bars_requested;
            let timeout_seconds = self.config.fetch_timeout_secs;

            tasks.spawn(async move {
                let outcome = if !provider.supports_symbol(&symbol, resolution) {
                    warn!("{} does not serve {} at {}", provider.name(), symbol, resolution);
                    Err(DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                    .into())
                } else {
                    match tokio::time::timeout(timeout, provider.fetch_prices(&symbol, resolution, count)).await {
                        Ok(result) => result,
                        Err(_) => Err(DataError::Timeout {
                            symbol: symbol.to_string(),
                            timeout_seconds,
                        }
                        .into()),
                    }
                };
                (symbol, outcome)
            });
        }

        let mut fetched = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => fetched.push(outcome),
                // The symbol is recorded as unavailable by build_dataset.
                Err(e) => error!("Fetch task failed: {}", e),
            }
        }
        fetched
    }

    /// Fetch, compute and assemble the dataset for all configured symbols.
    pub async fn run(&self) -> RdResult<SymbolDataset> {
        info!(
            "Computing risk metrics for {} symbols via {} ({} x {})",
            self.config.symbols.len(),
            self.provider.name(),
            self.config.bars_requested,
            self.config.resolution
        );
        debug!("Provider config: {}", self.provider.config());

        let fetched = self.fetch_all().await;
        let config = self.config.clone();
        let dataset = tokio::task::spawn_blocking(move || build_dataset(&config, fetched))
            .await
            .map_err(|e| internal_error!("metrics computation failed: {}", e))?;

        info!(
            "Risk run complete: {}/{} symbols available",
            dataset.available_count(),
            dataset.len()
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rd_data::{CsvDataProvider, SampleDataProvider};
    use rd_types::{Bar, MetricKind, MetricsConfig, RdError, Resolution, SymbolMetrics};
    use rust_decimal::Decimal;

    fn config(symbols: &[&str]) -> DashboardConfig {
        DashboardConfig::default()
            .with_symbols(symbols.iter().map(|s| Symbol::new(s)).collect())
            .with_bars(120)
            .with_metrics(MetricsConfig::default().with_windows(20, 30, 20))
    }

    fn sample() -> Arc<dyn MarketDataProvider> {
        Arc::new(
            SampleDataProvider::new()
                .with_anchor(Utc.with_ymd_and_hms(2024, 6, 28, 0, 0, 0).unwrap())
                .with_failing([Symbol::new("XAUUSD")]),
        )
    }

    /// Never answers within the timeout.
    #[derive(Debug)]
    struct StalledProvider;

    #[async_trait]
    impl MarketDataProvider for StalledProvider {
        fn supports_symbol(&self, _symbol: &Symbol, _resolution: Resolution) -> bool {
            true
        }

        async fn fetch_bars(&self, _: &Symbol, _: Resolution, _: usize) -> RdResult<Vec<Bar>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "stalled"
        }

        fn config(&self) -> serde_json::Value {
            serde_json::json!({ "type": "stalled" })
        }
    }

    /// Returns a series with a non-positive price.
    #[derive(Debug)]
    struct CorruptProvider;

    #[async_trait]
    impl MarketDataProvider for CorruptProvider {
        fn supports_symbol(&self, _symbol: &Symbol, _resolution: Resolution) -> bool {
            true
        }

        async fn fetch_bars(&self, symbol: &Symbol, resolution: Resolution, _: usize) -> RdResult<Vec<Bar>> {
            let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            Ok([Decimal::from(10), Decimal::ZERO, Decimal::from(11)]
                .into_iter()
                .enumerate()
                .map(|(i, close)| {
                    Bar::new(
                        symbol.clone(),
                        t0 + chrono::Duration::days(i as i64),
                        close,
                        close,
                        close,
                        close,
                        Decimal::ZERO,
                        resolution,
                    )
                })
                .collect())
        }

        fn name(&self) -> &str {
            "corrupt"
        }

        fn config(&self) -> serde_json::Value {
            serde_json::json!({ "type": "corrupt" })
        }
    }

    #[tokio::test]
    async fn test_unavailable_symbol_does_not_abort_run() {
        let engine = RiskEngine::new(config(&["EURUSD", "USDJPY", "GBPUSD", "XAUUSD"]), sample()).unwrap();
        let dataset = engine.run().await.unwrap();

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.available_count(), 3);
        assert!(matches!(
            dataset.get(&Symbol::new("XAUUSD")),
            Some(SymbolMetrics::Unavailable { .. })
        ));

        for symbol in ["EURUSD", "USDJPY", "GBPUSD"] {
            let records = dataset.get(&Symbol::new(symbol)).unwrap().records().unwrap();
            assert_eq!(records.len(), 119);
            assert!(records[18].rolling_volatility.is_none());
            assert!(records[19].rolling_volatility.is_some());
            assert!(records[28].rolling_sharpe.is_none());
            assert!(records[29].rolling_sharpe.is_some());
            assert!(records.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        }
    }

    #[tokio::test]
    async fn test_run_is_reproducible() {
        let engine = RiskEngine::new(config(&["EURUSD"]), sample()).unwrap();
        let a = engine.run().await.unwrap();
        let b = engine.run().await.unwrap();

        let symbol = Symbol::new("EURUSD");
        assert_eq!(
            a.series(&symbol, MetricKind::ValueAtRisk),
            b.series(&symbol, MetricKind::ValueAtRisk)
        );
    }

    #[tokio::test]
    async fn test_duplicate_symbols_collapse() {
        let engine = RiskEngine::new(config(&["EURUSD", "EURUSD"]), sample()).unwrap();
        assert_eq!(engine.fetch_all().await.len(), 1);
        assert_eq!(engine.run().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_timeout_marks_unavailable() {
        let mut cfg = config(&["EURUSD"]);
        cfg.fetch_timeout_secs = 1;
        let engine = RiskEngine::new(cfg, Arc::new(StalledProvider)).unwrap();

        let fetched = engine.fetch_all().await;
        assert!(matches!(
            fetched[0].1,
            Err(RdError::Data(DataError::Timeout { timeout_seconds: 1, .. }))
        ));
        let dataset = engine.run().await.unwrap();
        assert!(!dataset.get(&Symbol::new("EURUSD")).unwrap().is_available());
    }

    #[tokio::test]
    async fn test_corrupt_prices_are_unavailable() {
        let engine = RiskEngine::new(config(&["GBPUSD"]), Arc::new(CorruptProvider)).unwrap();
        let dataset = engine.run().await.unwrap();
        assert_eq!(dataset.available_count(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_resolution_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let rows: String = (1..=40)
            .map(|d| format!("{},{}\n", 1704067200 + d * 14_400, 1.0 + 0.001 * (d % 7) as f64))
            .collect();
        std::fs::write(dir.path().join("EURUSD_4h.csv"), format!("time,close\n{}", rows)).unwrap();
        let provider: Arc<dyn MarketDataProvider> = Arc::new(CsvDataProvider::new(dir.path()));

        let daily = RiskEngine::new(config(&["EURUSD"]), Arc::clone(&provider)).unwrap();
        let fetched = daily.fetch_all().await;
        assert!(matches!(
            fetched[0].1,
            Err(RdError::Data(DataError::SymbolNotFound { .. }))
        ));
        assert_eq!(daily.run().await.unwrap().available_count(), 0);

        let four_hour = RiskEngine::new(config(&["EURUSD"]).with_resolution(Resolution::FourHour), provider).unwrap();
        let dataset = four_hour.run().await.unwrap();
        assert_eq!(dataset.get(&Symbol::new("EURUSD")).unwrap().records().unwrap().len(), 39);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = config(&["EURUSD"]).with_metrics(MetricsConfig::default().with_confidence(2.0));
        assert!(RiskEngine::new(cfg, sample()).is_err());
    }
}
