use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instrument identifier as understood by the market data provider (e.g. `EURUSD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol {
    pub symbol: String,
}

impl Symbol {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.symbol
    }
}

impl From<&str> for Symbol {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Bar granularity requested from the market data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    Minute,
    FiveMinute,
    FifteenMinute,
    Hour,
    FourHour,
    Day,
    Week,
    Month,
}

impl Resolution {
    pub fn to_seconds(&self) -> u64 {
        match self {
            Resolution::Minute => 60,
            Resolution::FiveMinute => 300,
            Resolution::FifteenMinute => 900,
            Resolution::Hour => 3600,
            Resolution::FourHour => 14400,
            Resolution::Day => 86400,
            Resolution::Week => 604800,
            Resolution::Month => 2629746, // Average month
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.to_seconds() as i64)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resolution::Minute => "1m",
            Resolution::FiveMinute => "5m",
            Resolution::FifteenMinute => "15m",
            Resolution::Hour => "1h",
            Resolution::FourHour => "4h",
            Resolution::Day => "1d",
            Resolution::Week => "1w",
            Resolution::Month => "1M",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Resolution {
    type Err = String;

    /// Accepts the short form produced by `Display` as well as terminal-style
    /// timeframe codes (`M1`, `H4`, `D1`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" | "M1" => Ok(Resolution::Minute),
            "5m" | "M5" => Ok(Resolution::FiveMinute),
            "15m" | "M15" => Ok(Resolution::FifteenMinute),
            "1h" | "H1" => Ok(Resolution::Hour),
            "4h" | "H4" => Ok(Resolution::FourHour),
            "1d" | "D1" => Ok(Resolution::Day),
            "1w" | "W1" => Ok(Resolution::Week),
            "1M" | "MN1" => Ok(Resolution::Month),
            other => Err(format!("unknown resolution '{}'", other)),
        }
    }
}

/// OHLCV bar as delivered by a market data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: Symbol,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub resolution: Resolution,
}

impl Bar {
    pub fn new(
        symbol: Symbol,
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        resolution: Resolution,
    ) -> Self {
        Self {
            symbol,
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            resolution,
        }
    }
}

/// A single observed price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Ordered closing prices for one symbol, oldest first.
///
/// Construction does not validate; ordering and positivity are checked by the
/// return calculator so that a malformed series is reported per symbol instead
/// of at the provider boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, points: Vec<PricePoint>) -> Self {
        Self { symbol, points }
    }

    /// Build a series from provider bars using the closing price.
    pub fn from_bars(symbol: Symbol, bars: &[Bar]) -> Self {
        use rust_decimal::prelude::ToPrimitive;

        let points = bars
            .iter()
            .map(|bar| PricePoint::new(bar.timestamp, bar.close.to_f64().unwrap_or(f64::NAN)))
            .collect();
        Self { symbol, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_resolution_round_trips_through_display() {
        for resolution in [
            Resolution::Minute,
            Resolution::FiveMinute,
            Resolution::FifteenMinute,
            Resolution::Hour,
            Resolution::FourHour,
            Resolution::Day,
            Resolution::Week,
            Resolution::Month,
        ] {
            assert_eq!(resolution.to_string().parse::<Resolution>(), Ok(resolution));
        }
    }

    #[test]
    fn test_resolution_accepts_terminal_codes() {
        assert_eq!("D1".parse::<Resolution>(), Ok(Resolution::Day));
        assert_eq!("H4".parse::<Resolution>(), Ok(Resolution::FourHour));
        assert!("D2".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_symbol_serializes_as_plain_string() {
        let s = Symbol::new("EURUSD");
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"EURUSD\"");
        assert_eq!(s.to_string(), "EURUSD");
    }

    #[test]
    fn test_price_series_from_bars_uses_close() {
        let symbol = Symbol::new("XAUUSD");
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bar = Bar::new(
            symbol.clone(),
            ts,
            dec!(2000),
            dec!(2010),
            dec!(1990),
            dec!(2005.5),
            dec!(100),
            Resolution::Day,
        );

        let series = PriceSeries::from_bars(symbol, &[bar]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.points[0].timestamp, ts);
        assert_eq!(series.points[0].price, 2005.5);
    }
}
