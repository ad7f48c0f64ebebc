use crate::blend::{Ratio, blend_outcomes};
use crate::error::AnalyticsError;
use crate::stats::{arith_return_pct, growth_return_pct};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Default spacing of the ratio grid.
pub const DEFAULT_STEP: f64 = 0.01;

/// Geometric means closer than this (in percentage points) count as equal,
/// so the earliest ratio keeps the lead on a flat curve.
pub const TIE_TOLERANCE: f64 = 1e-9;

/// One point of the ratio sweep. `ratio` is the share given to the first array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub ratio: f64,
    pub arith_mean: f64,
    pub geom_mean: f64,
}

/// The full sweep in ascending ratio order. Iterating borrows, so the curve
/// can be walked as many times as needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioCurve {
    points: Vec<CurvePoint>,
}

impl RatioCurve {
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CurvePoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<'a> IntoIterator for &'a RatioCurve {
    type Item = &'a CurvePoint;
    type IntoIter = std::slice::Iter<'a, CurvePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Result of [`find_optimal_ratio`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalRatio {
    pub ratio: f64,
    pub geom_mean: f64,
    pub curve: RatioCurve,
}

/// Sweeps the share of `a` over `{0, step, 2*step, ..., 1}` and reports the
/// share that maximizes the blended geometric mean (the Kelly-optimal ratio).
///
/// Ties go to the smallest share. A point whose blend contains a zero outcome
/// is a total loss and scores -100%; only negative outcomes abort the sweep.
pub fn find_optimal_ratio(
    a: &[f64],
    b: &[f64],
    step: f64,
) -> Result<OptimalRatio, AnalyticsError> {
    if a.len() != b.len() {
        return Err(AnalyticsError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let grid = ratio_grid(step)?;
    let mut points = Vec::with_capacity(grid.len());
    let mut best: Option<CurvePoint> = None;

    for share in grid {
        let ratio = decimal_ratio(share)?;
        let blended = blend_outcomes(a, b, ratio)?;
        let point = CurvePoint {
            ratio: ratio.first(),
            arith_mean: arith_return_pct(&blended)?,
            geom_mean: growth_return_pct(&blended)?,
        };

        match best {
            Some(current) if point.geom_mean <= current.geom_mean + TIE_TOLERANCE => {}
            _ => best = Some(point),
        }
        points.push(point);
    }

    // The grid always holds at least 0 and 1.
    let best = best.ok_or_else(|| {
        AnalyticsError::NotEnoughData("ratio grid produced no points".to_string())
    })?;

    tracing::debug!(
        step,
        points = points.len(),
        optimal_ratio = best.ratio,
        optimal_geom_mean = best.geom_mean,
        "Ratio sweep complete"
    );

    Ok(OptimalRatio {
        ratio: best.ratio,
        geom_mean: best.geom_mean,
        curve: RatioCurve { points },
    })
}

/// Exact decimal grid `0, step, ..., 1`. The step must divide 1.
pub fn ratio_grid(step: f64) -> Result<Vec<Decimal>, AnalyticsError> {
    if !step.is_finite() || step <= 0.0 || step > 1.0 {
        return Err(AnalyticsError::InvalidRatio(format!(
            "sweep step must be in (0, 1], got {}",
            step
        )));
    }
    // Shortest round-trip text of the float, so 0.01 becomes exactly 0.01.
    let step = Decimal::from_str(&step.to_string()).map_err(|e| {
        AnalyticsError::InvalidRatio(format!("sweep step {} is not representable: {}", step, e))
    })?;
    if step.is_zero() || !(dec!(1) % step).is_zero() {
        return Err(AnalyticsError::InvalidRatio(format!(
            "sweep step {} does not divide the unit interval",
            step
        )));
    }

    let count = (dec!(1) / step).to_u64().ok_or_else(|| {
        AnalyticsError::InvalidRatio(format!("sweep step {} yields too many points", step))
    })?;

    Ok((0..=count).map(|i| step * Decimal::from(i)).collect())
}

fn decimal_ratio(share: Decimal) -> Result<Ratio, AnalyticsError> {
    let first = share.to_f64();
    let second = (dec!(1) - share).to_f64();
    match (first, second) {
        (Some(first), Some(second)) => Ratio::new(first, second),
        _ => Err(AnalyticsError::InvalidRatio(format!(
            "share {} cannot be converted",
            share
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_hits_both_ends_exactly() {
        let grid = ratio_grid(0.01).unwrap();
        assert_eq!(grid.len(), 101);
        assert_eq!(grid[0], Decimal::ZERO);
        assert_eq!(grid[100], dec!(1));
        assert_eq!(grid[37], dec!(0.37));
        assert_eq!(ratio_grid(0.25).unwrap().len(), 5);
        assert_eq!(ratio_grid(1.0).unwrap().len(), 2);
    }

    #[test]
    fn test_grid_rejects_bad_steps() {
        for step in [0.0, -0.1, 1.5, f64::NAN, 0.3] {
            assert!(
                matches!(ratio_grid(step), Err(AnalyticsError::InvalidRatio(_))),
                "step {} should be rejected",
                step
            );
        }
    }

    #[test]
    fn test_kelly_optimum_for_double_or_half() {
        // Doubling or halving with equal odds against cash peaks at a 50% stake.
        let bet = [0.5, 2.0];
        let cash = [1.0, 1.0];
        let optimal = find_optimal_ratio(&bet, &cash, DEFAULT_STEP).unwrap();

        assert!((optimal.ratio - 0.5).abs() < 1e-12);
        let expected = (1.125f64.sqrt() - 1.0) * 100.0;
        assert!((optimal.geom_mean - expected).abs() < 1e-9);
        assert_eq!(optimal.curve.len(), 101);
        assert_eq!(optimal.curve.points()[0].ratio, 0.0);
        assert_eq!(optimal.curve.points()[100].ratio, 1.0);
    }

    #[test]
    fn test_total_loss_bet_still_has_an_optimum() {
        // Lose the stake or gain 150% with equal odds: Kelly stakes p - q/b = 1/6.
        let optimal = find_optimal_ratio(&[0.0, 2.5], &[1.0, 1.0], DEFAULT_STEP).unwrap();

        assert!((optimal.ratio - 0.17).abs() < 1e-12);
        let expected = ((1.0 + 1.5 * 0.17f64).sqrt() * (1.0 - 0.17f64).sqrt() - 1.0) * 100.0;
        assert!((optimal.geom_mean - expected).abs() < 1e-9);
        assert_eq!(optimal.curve.points()[100].geom_mean, -100.0);
    }

    #[test]
    fn test_negative_blend_aborts_sweep() {
        assert!(matches!(
            find_optimal_ratio(&[-0.5, 2.0], &[1.0, 1.0], 0.5),
            Err(AnalyticsError::Domain(_))
        ));
    }

    #[test]
    fn test_flat_curve_picks_first_ratio() {
        let a = [1.1, 1.1, 1.1, 1.1];
        let b = [1.1, 1.1, 1.1, 1.1];
        let optimal = find_optimal_ratio(&a, &b, 0.05).unwrap();

        assert_eq!(optimal.ratio, 0.0);
        let first = optimal.curve.points()[0].geom_mean;
        for point in &optimal.curve {
            assert!((point.geom_mean - first).abs() < 1e-9);
        }
    }

    #[test]
    fn test_curve_is_restartable() {
        let optimal = find_optimal_ratio(&[0.5, 2.0], &[1.0, 1.0], 0.1).unwrap();
        let first_pass: Vec<f64> = optimal.curve.iter().map(|p| p.geom_mean).collect();
        let second_pass: Vec<f64> = optimal.curve.iter().map(|p| p.geom_mean).collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass.len(), 11);
    }

    #[test]
    fn test_sweep_length_mismatch() {
        assert!(matches!(
            find_optimal_ratio(&[1.0, 1.1], &[1.0], 0.1),
            Err(AnalyticsError::LengthMismatch { left: 2, right: 1 })
        ));
    }
}
