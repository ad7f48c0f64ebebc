use crate::distribution::OutcomeDistribution;
use crate::error::AnalyticsError;
use crate::stats::{arith_return_pct, geom_return_pct};
use core_types::CostBasis;
use serde::Serialize;

/// Allowed distance of a ratio's sum from 1.
pub const RATIO_TOLERANCE: f64 = 1e-9;

/// An allocation split between two outcome sources. Both shares are
/// non-negative and sum to 1 within [`RATIO_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ratio {
    first: f64,
    second: f64,
}

impl Ratio {
    pub fn new(first: f64, second: f64) -> Result<Self, AnalyticsError> {
        if !first.is_finite() || !second.is_finite() {
            return Err(AnalyticsError::InvalidRatio(format!(
                "shares must be finite, got [{}, {}]",
                first, second
            )));
        }
        if first < 0.0 || second < 0.0 {
            return Err(AnalyticsError::InvalidRatio(format!(
                "shares must be non-negative, got [{}, {}]",
                first, second
            )));
        }
        if ((first + second) - 1.0).abs() > RATIO_TOLERANCE {
            return Err(AnalyticsError::InvalidRatio(format!(
                "shares must sum to 1, got [{}, {}] (sum {})",
                first,
                second,
                first + second
            )));
        }
        Ok(Self { first, second })
    }

    /// Accepts a ratio as a sequence, which must have exactly two elements.
    pub fn from_slice(shares: &[f64]) -> Result<Self, AnalyticsError> {
        match shares {
            [first, second] => Self::new(*first, *second),
            _ => Err(AnalyticsError::InvalidRatio(format!(
                "expected exactly two shares, got {}",
                shares.len()
            ))),
        }
    }

    /// `[share, 1 - share]`.
    pub fn with_first_share(share: f64) -> Result<Self, AnalyticsError> {
        Self::new(share, 1.0 - share)
    }

    pub fn first(&self) -> f64 {
        self.first
    }

    pub fn second(&self) -> f64 {
        self.second
    }
}

impl TryFrom<&[f64]> for Ratio {
    type Error = AnalyticsError;

    fn try_from(shares: &[f64]) -> Result<Self, Self::Error> {
        Self::from_slice(shares)
    }
}

/// The parts of a source distribution a blend keeps a reference to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub name: String,
    pub arith_mean: f64,
    pub geom_mean: f64,
}

impl From<&OutcomeDistribution> for Leg {
    fn from(dist: &OutcomeDistribution) -> Self {
        Self {
            name: dist.name().to_string(),
            arith_mean: dist.arith_mean(),
            geom_mean: dist.geom_mean(),
        }
    }
}

/// Two distributions combined elementwise under a ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendedOutcome {
    first: Leg,
    second: Leg,
    ratio: Ratio,
    results: Vec<f64>,
    arith_mean: f64,
    geom_mean: f64,
}

impl BlendedOutcome {
    /// Blends `a` and `b`: `results[i] = ratio.first * a[i] + ratio.second * b[i]`.
    ///
    /// # Errors
    ///
    /// * `LengthMismatch` if the outcome arrays differ in length. Callers pair
    ///   the sample spaces themselves, see [`OutcomeDistribution::repeat_each`].
    /// * `Domain` if a blended outcome is not strictly positive.
    pub fn combine(
        a: &OutcomeDistribution,
        b: &OutcomeDistribution,
        ratio: Ratio,
    ) -> Result<Self, AnalyticsError> {
        let results = blend_outcomes(a.outcomes(), b.outcomes(), ratio)?;
        let arith_mean = arith_return_pct(&results)?;
        let geom_mean = geom_return_pct(&results)?;

        let blended = Self {
            first: Leg::from(a),
            second: Leg::from(b),
            ratio,
            results,
            arith_mean,
            geom_mean,
        };

        tracing::debug!(
            first = %blended.first.name,
            second = %blended.second.name,
            ratio_first = ratio.first(),
            arith_mean,
            geom_mean,
            cost = blended.cost(),
            net = blended.net(),
            "Combined outcome distributions"
        );
        if geom_mean < 0.0 {
            tracing::warn!(
                first = %blended.first.name,
                second = %blended.second.name,
                geom_mean,
                "Blend shrinks wealth under compounding"
            );
        }

        Ok(blended)
    }

    pub fn first(&self) -> &Leg {
        &self.first
    }

    pub fn second(&self) -> &Leg {
        &self.second
    }

    pub fn ratio(&self) -> Ratio {
        self.ratio
    }

    /// The elementwise blended outcomes.
    pub fn results(&self) -> &[f64] {
        &self.results
    }

    /// Arithmetic mean return of the blend, in percent.
    pub fn arith_mean(&self) -> f64 {
        self.arith_mean
    }

    /// Geometric mean return of the blend, in percent.
    pub fn geom_mean(&self) -> f64 {
        self.geom_mean
    }

    /// Arithmetic premium or shortfall of the blend against both legs held alone.
    pub fn cost(&self) -> f64 {
        self.cost_against(CostBasis::BothLegs)
    }

    /// Geometric analog of [`Self::cost`].
    pub fn net(&self) -> f64 {
        self.net_against(CostBasis::BothLegs)
    }

    pub fn cost_against(&self, basis: CostBasis) -> f64 {
        match basis {
            CostBasis::BothLegs => {
                self.arith_mean - self.first.arith_mean - self.second.arith_mean
            }
            CostBasis::FirstLegOnly => self.arith_mean - self.first.arith_mean,
        }
    }

    pub fn net_against(&self, basis: CostBasis) -> f64 {
        match basis {
            CostBasis::BothLegs => self.geom_mean - self.first.geom_mean - self.second.geom_mean,
            CostBasis::FirstLegOnly => self.geom_mean - self.first.geom_mean,
        }
    }
}

/// Shorthand for [`BlendedOutcome::combine`].
pub fn combine(
    a: &OutcomeDistribution,
    b: &OutcomeDistribution,
    ratio: Ratio,
) -> Result<BlendedOutcome, AnalyticsError> {
    BlendedOutcome::combine(a, b, ratio)
}

/// Elementwise weighted sum of two equally long outcome arrays.
pub fn blend_outcomes(a: &[f64], b: &[f64], ratio: Ratio) -> Result<Vec<f64>, AnalyticsError> {
    if a.len() != b.len() {
        return Err(AnalyticsError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a
        .iter()
        .zip(b)
        .map(|(x, y)| ratio.first * x + ratio.second * y)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dice() -> OutcomeDistribution {
        OutcomeDistribution::new("dice", &[0.5, 1.05, 1.5], &[1, 4, 1]).unwrap()
    }

    fn cash() -> OutcomeDistribution {
        OutcomeDistribution::new("cash", &[1.0], &[6]).unwrap()
    }

    #[test]
    fn test_ratio_validation() {
        assert!(Ratio::new(0.6, 0.4).is_ok());
        assert!(Ratio::new(0.3, 0.7 + 5e-10).is_ok());
        assert!(matches!(
            Ratio::new(0.6, 0.5),
            Err(AnalyticsError::InvalidRatio(_))
        ));
        assert!(matches!(
            Ratio::new(1.5, -0.5),
            Err(AnalyticsError::InvalidRatio(_))
        ));
        assert!(matches!(
            Ratio::from_slice(&[1.0]),
            Err(AnalyticsError::InvalidRatio(_))
        ));
        assert!(matches!(
            Ratio::from_slice(&[0.2, 0.3, 0.5]),
            Err(AnalyticsError::InvalidRatio(_))
        ));
        assert!(matches!(
            Ratio::try_from(&[f64::NAN, 1.0][..]),
            Err(AnalyticsError::InvalidRatio(_))
        ));
    }

    #[test]
    fn test_full_first_share_reproduces_first_leg() {
        let a = dice();
        let b = cash();
        let blended = combine(&a, &b, Ratio::new(1.0, 0.0).unwrap()).unwrap();
        assert_eq!(blended.results(), a.outcomes());
        assert_eq!(blended.arith_mean(), a.arith_mean());
        assert_eq!(blended.geom_mean(), a.geom_mean());
        assert!((blended.cost() + b.arith_mean()).abs() < 1e-12);
    }

    #[test]
    fn test_half_cash_blend_improves_geometric_mean() {
        let a = dice();
        let b = cash();
        let blended = combine(&a, &b, Ratio::new(0.5, 0.5).unwrap()).unwrap();

        let expected = [0.75, 1.025, 1.025, 1.025, 1.025, 1.25];
        for (got, want) in blended.results().iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
        // Half the arithmetic edge is given up...
        assert!(blended.arith_mean() < a.arith_mean());
        assert!(blended.cost() < 0.0);
        // ...but compounding improves.
        assert!(blended.geom_mean() > a.geom_mean());
        assert!(blended.net() > 0.0);
        assert_eq!(blended.first().name, "dice");
        assert_eq!(blended.second().name, "cash");
    }

    #[test]
    fn test_cost_basis_variants() {
        let a = dice();
        let b = OutcomeDistribution::new("bond", &[1.02], &[6]).unwrap();
        let blended = combine(&a, &b, Ratio::new(0.7, 0.3).unwrap()).unwrap();

        let both = blended.cost_against(CostBasis::BothLegs);
        let first_only = blended.cost_against(CostBasis::FirstLegOnly);
        assert!((first_only - both - b.arith_mean()).abs() < 1e-9);

        let net_both = blended.net_against(CostBasis::BothLegs);
        let net_first = blended.net_against(CostBasis::FirstLegOnly);
        assert!((net_first - net_both - b.geom_mean()).abs() < 1e-9);
        assert_eq!(blended.cost(), both);
        assert_eq!(blended.net(), net_both);
    }

    #[test]
    fn test_length_mismatch() {
        let a = dice();
        let b = OutcomeDistribution::new("cash", &[1.0], &[1]).unwrap();
        assert!(matches!(
            combine(&a, &b, Ratio::new(0.5, 0.5).unwrap()),
            Err(AnalyticsError::LengthMismatch { left: 6, right: 1 })
        ));
        let stretched = b.repeat_each(6).unwrap();
        assert!(combine(&a, &stretched, Ratio::new(0.5, 0.5).unwrap()).is_ok());
    }

    #[test]
    fn test_combine_is_deterministic() {
        let ratio = Ratio::new(0.4, 0.6).unwrap();
        let first = combine(&dice(), &cash(), ratio).unwrap();
        let second = combine(&dice(), &cash(), ratio).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.net().to_bits(), second.net().to_bits());
    }
}
