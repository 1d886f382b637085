//! Simple period returns from a price series.

use rd_types::{MetricsError, PricePoint, PriceSeries, ReturnPoint};

/// Check that the series is non-empty, with finite, strictly positive prices
/// and strictly increasing timestamps.
pub fn validate_prices(points: &[PricePoint]) -> Result<(), MetricsError> {
    if points.is_empty() {
        return Err(MetricsError::invalid_input("empty price series"));
    }
    for (i, point) in points.iter().enumerate() {
        if !point.price.is_finite() || point.price <= 0.0 {
            return Err(MetricsError::invalid_input(format!(
                "non-positive price {} at {}",
                point.price, point.timestamp
            )));
        }
        if i > 0 && point.timestamp <= points[i - 1].timestamp {
            return Err(MetricsError::invalid_input(format!(
                "timestamps not strictly increasing: {} follows {}",
                point.timestamp,
                points[i - 1].timestamp
            )));
        }
    }
    Ok(())
}

/// `r[i] = p[i] / p[i-1] - 1`, stamped with the later timestamp.
///
/// A series with fewer than two prices yields no returns.
pub fn simple_returns(series: &PriceSeries) -> Result<Vec<ReturnPoint>, MetricsError> {
    validate_prices(&series.points)?;

    Ok(series
        .points
        .windows(2)
        .map(|pair| ReturnPoint {
            timestamp: pair[1].timestamp,
            value: pair[1].price / pair[0].price - 1.0,
        })
        .collect())
}
