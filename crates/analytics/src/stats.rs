//! Plain statistics over outcome arrays.
//!
//! Outcomes are multiplicative (1.05 = +5%). The `*_return_pct` helpers rescale
//! a statistic to a percentage return around the neutral value 1.0.

use crate::error::AnalyticsError;
use core_types::to_percent;

/// Arithmetic mean of a non-empty slice.
pub fn mean(values: &[f64]) -> Result<f64, AnalyticsError> {
    if values.is_empty() {
        return Err(AnalyticsError::NotEnoughData(
            "mean of an empty series".to_string(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Geometric mean of a non-empty slice of strictly positive values.
///
/// Computed in log space, `exp(mean(ln x))`, so long series do not overflow the product.
pub fn geometric_mean(values: &[f64]) -> Result<f64, AnalyticsError> {
    if values.is_empty() {
        return Err(AnalyticsError::NotEnoughData(
            "geometric mean of an empty series".to_string(),
        ));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v <= 0.0) {
        return Err(AnalyticsError::Domain(format!(
            "outcome {} is not strictly positive",
            bad
        )));
    }
    let log_sum: f64 = values.iter().map(|v| v.ln()).sum();
    Ok((log_sum / values.len() as f64).exp())
}

/// Arithmetic mean expressed as a percentage return.
pub fn arith_return_pct(outcomes: &[f64]) -> Result<f64, AnalyticsError> {
    mean(outcomes).map(to_percent)
}

/// Geometric mean expressed as a percentage return.
pub fn geom_return_pct(outcomes: &[f64]) -> Result<f64, AnalyticsError> {
    geometric_mean(outcomes).map(to_percent)
}

/// Geometric mean return in percent where a zero outcome is a total loss.
///
/// Any zero makes the product zero, so the result is exactly -100%. Negative
/// or non-finite outcomes are still a `Domain` error.
pub fn growth_return_pct(outcomes: &[f64]) -> Result<f64, AnalyticsError> {
    if let Some(bad) = outcomes.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(AnalyticsError::Domain(format!("outcome {} is negative", bad)));
    }
    if !outcomes.is_empty() && outcomes.contains(&0.0) {
        return Ok(-100.0);
    }
    geom_return_pct(outcomes)
}

/// Percentile `p` (0..=100) with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], p: f64) -> Result<f64, AnalyticsError> {
    if values.is_empty() {
        return Err(AnalyticsError::NotEnoughData(
            "percentile of an empty series".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(AnalyticsError::Domain(format!(
            "percentile {} is outside 0..=100",
            p
        )));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(percentile_of_sorted(&sorted, p))
}

/// Same as [`percentile`] for data that is already sorted ascending and non-empty.
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Splits `outcomes` into `n` consecutive, nearly equal chunks and returns the
/// percentage return of each chunk's mean.
///
/// The first `len % n` chunks hold one extra element.
pub fn category_means(outcomes: &[f64], n: usize) -> Result<Vec<f64>, AnalyticsError> {
    if n == 0 || n > outcomes.len() {
        return Err(AnalyticsError::NotEnoughData(format!(
            "cannot split {} outcomes into {} categories",
            outcomes.len(),
            n
        )));
    }
    let base = outcomes.len() / n;
    let extra = outcomes.len() % n;

    let mut means = Vec::with_capacity(n);
    let mut start = 0;
    for i in 0..n {
        let len = base + usize::from(i < extra);
        means.push(arith_return_pct(&outcomes[start..start + len])?);
        start += len;
    }
    Ok(means)
}

/// Sorted distinct values with the number of times each occurs.
pub fn distinct_counts(outcomes: &[f64]) -> Vec<(f64, usize)> {
    let mut sorted = outcomes.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut counts: Vec<(f64, usize)> = Vec::new();
    for value in sorted {
        match counts.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => counts.push((value, 1)),
        }
    }
    counts
}
