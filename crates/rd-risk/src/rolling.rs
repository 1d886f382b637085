//! Fixed-window rolling statistics over a numeric sequence.
//!
//! Every function returns a vector of the same length as its input. Position
//! `i` summarizes the trailing window `seq[i + 1 - w ..= i]` and is `None`
//! while `i < w - 1`.

use rd_types::MetricsError;

/// Standard deviations at or below this are treated as zero dispersion.
pub const MIN_STD: f64 = 1.0e-12;

fn check_window(window: usize) -> Result<(), MetricsError> {
    if window < 2 {
        return Err(MetricsError::InvalidWindow { window });
    }
    Ok(())
}

fn check_probability(q: f64) -> Result<(), MetricsError> {
    if !(q > 0.0 && q < 1.0) {
        return Err(MetricsError::InvalidProbability { probability: q });
    }
    Ok(())
}

/// Apply `f` to each full trailing window of `seq`.
pub fn rolling_apply<F>(seq: &[f64], window: usize, f: F) -> Result<Vec<Option<f64>>, MetricsError>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    check_window(window)?;

    Ok((0..seq.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                f(&seq[i + 1 - window..=i])
            }
        })
        .collect())
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator); `None` for fewer than two
/// values or zero dispersion.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    let std = (sum_sq / (values.len() - 1) as f64).sqrt();

    if std <= MIN_STD {
        None
    } else {
        Some(std)
    }
}

/// Quantile of an ascending slice, interpolating linearly at `q * (n - 1)`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Mean of the values at or below `threshold`, or the threshold itself when
/// nothing qualifies.
pub fn tail_mean(values: &[f64], threshold: f64) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|&&v| v <= threshold)
        .fold((0.0, 0usize), |(s, c), &v| (s + v, c + 1));

    if count == 0 {
        threshold
    } else {
        // Summation rounding must not lift the mean above the threshold.
        (sum / count as f64).min(threshold)
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

pub fn rolling_mean(seq: &[f64], window: usize) -> Result<Vec<Option<f64>>, MetricsError> {
    rolling_apply(seq, window, mean)
}

pub fn rolling_std(seq: &[f64], window: usize) -> Result<Vec<Option<f64>>, MetricsError> {
    rolling_apply(seq, window, sample_std)
}

pub fn rolling_quantile(seq: &[f64], window: usize, q: f64) -> Result<Vec<Option<f64>>, MetricsError> {
    check_probability(q)?;
    rolling_apply(seq, window, |w| quantile(&sorted_copy(w), q))
}

/// Rolling mean of the values at or below the rolling `q` quantile.
pub fn rolling_conditional_tail(
    seq: &[f64],
    window: usize,
    q: f64,
) -> Result<Vec<Option<f64>>, MetricsError> {
    Ok(rolling_tail_risk(seq, window, q)?
        .into_iter()
        .map(|pair| pair.map(|(_, tail)| tail))
        .collect())
}

/// Rolling `(quantile, tail mean)` pairs sharing one sort per window.
pub fn rolling_tail_risk(
    seq: &[f64],
    window: usize,
    q: f64,
) -> Result<Vec<Option<(f64, f64)>>, MetricsError> {
    check_window(window)?;
    check_probability(q)?;

    Ok((0..seq.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let sorted = sorted_copy(&seq[i + 1 - window..=i]);
            let threshold = quantile(&sorted, q)?;
            Some((threshold, tail_mean(&sorted, threshold)))
        })
        .collect())
}
