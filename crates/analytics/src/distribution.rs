use crate::error::AnalyticsError;
use crate::stats::{arith_return_pct, geom_return_pct};
use serde::Serialize;

/// Largest number of distinct results a bet may declare (one per die face).
pub const MAX_RESULTS: usize = 6;

/// Largest sample space a distribution may expand to.
pub const MAX_OUTCOMES: usize = 1_000_000;

/// A named, weighted set of multiplicative outcomes, e.g. a loaded die.
///
/// The sample space (`outcomes`) and both means are computed once at
/// construction. There are no setters; a distribution never changes after it
/// has been built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeDistribution {
    name: String,
    results: Vec<f64>,
    weights: Vec<u32>,
    outcomes: Vec<f64>,
    arith_mean: f64,
    geom_mean: f64,
}

impl OutcomeDistribution {
    /// Builds a distribution from 1 to 6 results and their integer weights.
    ///
    /// `outcomes` is each `results[i]` repeated `weights[i]` times, in input order.
    ///
    /// # Errors
    ///
    /// * `InvalidDistribution` if the name is blank, the lengths differ, the
    ///   length is outside `1..=6`, a weight is zero, or the weights sum past
    ///   [`MAX_OUTCOMES`].
    /// * `Domain` if any result is not strictly positive.
    pub fn new(name: &str, results: &[f64], weights: &[u32]) -> Result<Self, AnalyticsError> {
        validate_name(name)?;
        if results.len() != weights.len() {
            return Err(AnalyticsError::InvalidDistribution(format!(
                "'{}' has {} results but {} weights",
                name,
                results.len(),
                weights.len()
            )));
        }
        if results.is_empty() || results.len() > MAX_RESULTS {
            return Err(AnalyticsError::InvalidDistribution(format!(
                "'{}' must have 1 to {} results, got {}",
                name,
                MAX_RESULTS,
                results.len()
            )));
        }
        if let Some(position) = weights.iter().position(|&w| w == 0) {
            return Err(AnalyticsError::InvalidDistribution(format!(
                "'{}' weight at position {} must be at least 1",
                name, position
            )));
        }

        let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
        if total > MAX_OUTCOMES as u64 {
            return Err(AnalyticsError::InvalidDistribution(format!(
                "'{}' weights sum to {}, more than the {} outcomes allowed",
                name, total, MAX_OUTCOMES
            )));
        }

        let outcomes: Vec<f64> = results
            .iter()
            .zip(weights)
            .flat_map(|(&result, &weight)| std::iter::repeat_n(result, weight as usize))
            .collect();

        Self::from_parts(name, results.to_vec(), weights.to_vec(), outcomes)
    }

    /// Builds a distribution from weights given as floating-point numbers.
    ///
    /// Every weight must be a finite whole number of at least 1; `1.5` or `0.0`
    /// are rejected with `InvalidDistribution` before delegating to [`Self::new`].
    pub fn from_raw_weights(
        name: &str,
        results: &[f64],
        weights: &[f64],
    ) -> Result<Self, AnalyticsError> {
        let whole = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                if w.is_finite() && w.fract() == 0.0 && w >= 1.0 && w <= u32::MAX as f64 {
                    Ok(w as u32)
                } else {
                    Err(AnalyticsError::InvalidDistribution(format!(
                        "'{}' weight at position {} must be a positive integer, got {}",
                        name, i, w
                    )))
                }
            })
            .collect::<Result<Vec<u32>, _>>()?;
        Self::new(name, results, &whole)
    }

    /// Wraps an already expanded sample space of any non-zero length.
    ///
    /// Each outcome counts as a result of weight 1.
    pub fn from_outcomes(name: &str, outcomes: Vec<f64>) -> Result<Self, AnalyticsError> {
        validate_name(name)?;
        if outcomes.is_empty() {
            return Err(AnalyticsError::InvalidDistribution(format!(
                "'{}' has no outcomes",
                name
            )));
        }
        let weights = vec![1; outcomes.len()];
        Self::from_parts(name, outcomes.clone(), weights, outcomes)
    }

    fn from_parts(
        name: &str,
        results: Vec<f64>,
        weights: Vec<u32>,
        outcomes: Vec<f64>,
    ) -> Result<Self, AnalyticsError> {
        let arith_mean = arith_return_pct(&outcomes)?;
        let geom_mean = geom_return_pct(&outcomes).map_err(|e| match e {
            AnalyticsError::Domain(msg) => AnalyticsError::Domain(format!("'{}': {}", name, msg)),
            other => other,
        })?;

        tracing::debug!(
            name,
            outcomes = outcomes.len(),
            arith_mean,
            geom_mean,
            "Built outcome distribution"
        );

        Ok(Self {
            name: name.to_string(),
            results,
            weights,
            outcomes,
            arith_mean,
            geom_mean,
        })
    }

    /// Returns a distribution whose outcomes repeat every outcome `factor` times
    /// in place (`[a, b]` with factor 3 becomes `[a, a, a, b, b, b]`).
    ///
    /// Used to pair a coarse distribution elementwise with a finer one.
    pub fn repeat_each(&self, factor: usize) -> Result<Self, AnalyticsError> {
        if factor == 0 {
            return Err(AnalyticsError::InvalidDistribution(format!(
                "'{}' cannot be repeated zero times",
                self.name
            )));
        }
        if self.outcomes.len().saturating_mul(factor) > MAX_OUTCOMES {
            return Err(AnalyticsError::InvalidDistribution(format!(
                "'{}' repeated {} times exceeds {} outcomes",
                self.name, factor, MAX_OUTCOMES
            )));
        }
        let outcomes = self
            .outcomes
            .iter()
            .flat_map(|&o| std::iter::repeat_n(o, factor))
            .collect();
        Self::from_outcomes(&self.name, outcomes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn results(&self) -> &[f64] {
        &self.results
    }

    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    /// The expanded sample space.
    pub fn outcomes(&self) -> &[f64] {
        &self.outcomes
    }

    /// Arithmetic mean return in percent.
    pub fn arith_mean(&self) -> f64 {
        self.arith_mean
    }

    /// Geometric mean return in percent.
    pub fn geom_mean(&self) -> f64 {
        self.geom_mean
    }
}

fn validate_name(name: &str) -> Result<(), AnalyticsError> {
    if name.trim().is_empty() {
        return Err(AnalyticsError::InvalidDistribution(
            "distribution name must not be empty".to_string(),
        ));
    }
    Ok(())
}
