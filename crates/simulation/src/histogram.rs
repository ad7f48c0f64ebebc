use crate::error::SimulationError;
use analytics::stats::percentile;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width frequency table. Every bin is half-open `[lower, upper)` except
/// the last, which also holds the maximum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Spreads `values` over `bins` equal-width bins between their min and max.
///
/// When every value is the same the range is widened by 0.5 on each side.
pub fn histogram(values: &[f64], bins: usize) -> Result<Histogram, SimulationError> {
    if bins == 0 {
        return Err(SimulationError::InvalidSettings(
            "histogram needs at least one bin".to_string(),
        ));
    }
    if values.is_empty() {
        return Err(SimulationError::EmptyOutcomes);
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(SimulationError::InvalidSettings(
            "histogram values must be finite".to_string(),
        ));
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    Ok(Histogram {
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lo + width * i as f64,
                upper: lo + width * (i + 1) as f64,
                count,
            })
            .collect(),
    })
}

/// The `lo`-th and `hi`-th percentiles of `values`, e.g. `(5.0, 95.0)` for a 90% band.
pub fn interval(values: &[f64], lo: f64, hi: f64) -> Result<(f64, f64), SimulationError> {
    Ok((percentile(values, lo)?, percentile(values, hi)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0];
        let hist = histogram(&values, 2).unwrap();
        assert_eq!(hist.bins.len(), 2);
        assert_eq!(hist.bins[0].count, 2);
        // 0.5 sits on the boundary and the maximum belongs to the last bin.
        assert_eq!(hist.bins[1].count, 3);
        assert_eq!(hist.total(), values.len());
        assert_eq!(hist.bins[0].lower, 0.0);
        assert_eq!(hist.bins[1].upper, 1.0);
    }

    #[test]
    fn test_histogram_of_constant_values() {
        let hist = histogram(&[3.0, 3.0, 3.0], 4).unwrap();
        assert_eq!(hist.total(), 3);
        assert_eq!(hist.bins[0].lower, 2.5);
        assert_eq!(hist.bins[3].upper, 3.5);
    }

    #[test]
    fn test_histogram_rejects_bad_input() {
        assert!(histogram(&[1.0], 0).is_err());
        assert!(matches!(
            histogram(&[], 3),
            Err(SimulationError::EmptyOutcomes)
        ));
        assert!(histogram(&[1.0, f64::NAN], 3).is_err());
    }

    #[test]
    fn test_interval() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let (lo, hi) = interval(&values, 5.0, 95.0).unwrap();
        assert!((lo - 5.0).abs() < 1e-9);
        assert!((hi - 95.0).abs() < 1e-9);
    }
}
