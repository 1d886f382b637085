use async_trait::async_trait;
use chrono::{DateTime, DurationRound, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::ReaderBuilder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rd_types::{config_error, Bar, DataError, PriceSeries, RdResult, Resolution, Symbol};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::path::Path;

/// Source of historical bars for the risk engine.
#[async_trait]
pub trait MarketDataProvider: Send + Sync + std::fmt::Debug {
    /// Whether bars for `symbol` at `resolution` can be served.
    fn supports_symbol(&self, symbol: &Symbol, resolution: Resolution) -> bool;

    /// Fetch the `count` most recent bars, oldest first.
    async fn fetch_bars(
        &self,
        symbol: &Symbol,
        resolution: Resolution,
        count: usize,
    ) -> RdResult<Vec<Bar>>;

    /// Get provider name
    fn name(&self) -> &str;

    /// Get provider configuration
    fn config(&self) -> serde_json::Value;

    /// Fetch closing prices. An empty fetch is reported as [`DataError::NoData`]
    /// rather than as an empty series.
    async fn fetch_prices(
        &self,
        symbol: &Symbol,
        resolution: Resolution,
        count: usize,
    ) -> RdResult<PriceSeries> {
        let bars = self.fetch_bars(symbol, resolution, count).await?;
        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            }
            .into());
        }
        Ok(PriceSeries::from_bars(symbol.clone(), &bars))
    }
}

/// CSV data provider for loading local CSV files
#[derive(Debug)]
pub struct CsvDataProvider {
    pub name: String,
    pub data_directory: std::path::PathBuf,
    pub file_pattern: String,
}

const TIMESTAMP_COLUMNS: [&str; 5] = ["Date", "date", "time", "Time", "timestamp"];
const PRICE_COLUMNS: [&str; 4] = ["close", "Close", "Price", "price"];

impl CsvDataProvider {
    pub fn new<P: AsRef<Path>>(data_directory: P) -> Self {
        Self {
            name: "CSV Provider".to_string(),
            data_directory: data_directory.as_ref().to_path_buf(),
            file_pattern: "{symbol}_{resolution}.csv".to_string(),
        }
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.file_pattern = pattern.to_string();
        self
    }

    fn get_file_path(&self, symbol: &Symbol, resolution: Resolution) -> std::path::PathBuf {
        let filename = self
            .file_pattern
            .replace("{symbol}", &symbol.symbol)
            .replace("{resolution}", &resolution.to_string());

        self.data_directory.join(filename)
    }

    /// RFC3339, `%Y-%m-%d %H:%M:%S`, `%Y-%m-%d` or unix seconds.
    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DataError> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Ok(dt.and_utc());
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc());
            }
        }
        raw.parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .ok_or_else(|| DataError::ParseError {
                message: format!("Unrecognized timestamp '{}'", raw),
            })
    }

    fn read_bars(&self, path: &Path, symbol: &Symbol, resolution: Resolution) -> RdResult<Vec<Bar>> {
        let file = std::fs::File::open(path)?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| DataError::ParseError {
                message: format!("CSV header error: {}", e),
            })?
            .clone();
        let column = |candidates: &[&str]| headers.iter().position(|h| candidates.contains(&h.trim()));
        let ts_idx = column(&TIMESTAMP_COLUMNS[..]).ok_or_else(|| DataError::ParseError {
            message: format!("{}: no timestamp column", path.display()),
        })?;
        let price_idx = column(&PRICE_COLUMNS[..]).ok_or_else(|| DataError::ParseError {
            message: format!("{}: no close/price column", path.display()),
        })?;

        let mut bars = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| DataError::ParseError {
                message: format!("CSV parsing error: {}", e),
            })?;
            let timestamp = Self::parse_timestamp(record.get(ts_idx).unwrap_or_default())?;
            let raw_price = record.get(price_idx).unwrap_or_default().trim();
            let close = raw_price
                .parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(raw_price))
                .map_err(|e| DataError::ParseError {
                    message: format!("Failed to parse price '{}': {}", raw_price, e),
                })?;

            bars.push(Bar::new(
                symbol.clone(),
                timestamp,
                close,
                close,
                close,
                close,
                Decimal::ZERO,
                resolution,
            ));
        }

        bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataProvider for CsvDataProvider {
    fn supports_symbol(&self, symbol: &Symbol, resolution: Resolution) -> bool {
        self.get_file_path(symbol, resolution).exists()
    }

    async fn fetch_bars(
        &self,
        symbol: &Symbol,
        resolution: Resolution,
        count: usize,
    ) -> RdResult<Vec<Bar>> {
        let file_path = self.get_file_path(symbol, resolution);

        if !file_path.exists() {
            return Err(DataError::SourceNotFound(file_path.to_string_lossy().to_string()).into());
        }

        let mut bars = self.read_bars(&file_path, symbol, resolution)?;
        let skip = bars.len().saturating_sub(count);
        bars.drain(..skip);

        tracing::debug!("Loaded {} bars for {} from {}", bars.len(), symbol, file_path.display());
        Ok(bars)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "csv",
            "directory": self.data_directory,
            "pattern": self.file_pattern
        })
    }
}

/// Sample data provider for testing and demo purposes.
///
/// Produces a seeded random walk per symbol, so repeated fetches are identical.
/// Symbols registered with [`SampleDataProvider::with_failing`] always fail.
#[derive(Debug)]
pub struct SampleDataProvider {
    pub name: String,
    /// Bars end at this instant (rounded down to the resolution).
    pub anchor: DateTime<Utc>,
    /// Per-bar return dispersion.
    pub volatility: f64,
    failing: HashSet<Symbol>,
}

impl SampleDataProvider {
    pub fn new() -> Self {
        Self {
            name: "Sample Data Provider".to_string(),
            anchor: Utc::now(),
            volatility: 0.01,
            failing: HashSet::new(),
        }
    }

    pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_failing(mut self, symbols: impl IntoIterator<Item = Symbol>) -> Self {
        self.failing.extend(symbols);
        self
    }

    fn starting_price(symbol: &Symbol) -> f64 {
        match symbol.as_str() {
            "EURUSD" => 1.08,
            "GBPUSD" => 1.27,
            "USDJPY" => 150.0,
            "XAUUSD" => 2000.0,
            "BTCUSD" | "BTC-USD" => 45000.0,
            _ => 100.0,
        }
    }

    /// FNV-1a over the symbol name; stable across runs and platforms.
    fn seed(symbol: &Symbol) -> u64 {
        symbol
            .as_str()
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3))
    }
}

impl Default for SampleDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for SampleDataProvider {
    fn supports_symbol(&self, symbol: &Symbol, _resolution: Resolution) -> bool {
        !self.failing.contains(symbol)
    }

    async fn fetch_bars(
        &self,
        symbol: &Symbol,
        resolution: Resolution,
        count: usize,
    ) -> RdResult<Vec<Bar>> {
        if !self.supports_symbol(symbol, resolution) {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            }
            .into());
        }

        let step = resolution.duration();
        let end = self.anchor.duration_trunc(step).unwrap_or(self.anchor);
        let step_secs = step.num_seconds();
        let start = i64::try_from(count.saturating_sub(1))
            .ok()
            .and_then(|n| n.checked_mul(step_secs))
            .and_then(chrono::Duration::try_seconds)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| config_error!("{} bars at {} reach past the supported time range", count, resolution))?;

        let mut rng = StdRng::seed_from_u64(Self::seed(symbol));
        let mut price = Self::starting_price(symbol);
        let mut bars = Vec::with_capacity(count);

        for i in 0..count {
            // Bounded by the span checked above.
            let timestamp = start + chrono::Duration::seconds(step_secs * i as i64);
            let open = price;
            let shock: f64 = rng.random_range(-1.0..1.0);
            price *= 1.0 + shock * self.volatility * 3f64.sqrt();

            let open = Decimal::from_f64_retain(open).unwrap_or_default();
            let close = Decimal::from_f64_retain(price).unwrap_or_default();
            bars.push(Bar::new(
                symbol.clone(),
                timestamp,
                open,
                open.max(close),
                open.min(close),
                close,
                Decimal::ZERO,
                resolution,
            ));
        }

        Ok(bars)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "sample",
            "volatility": self.volatility,
            "failing_symbols": self.failing.iter().map(|s| s.to_string()).collect::<Vec<_>>()
        })
    }
}
