//! Bernoulli's expected value for sizing a lottery-style wager, and the
//! arithmetic of recovering from a loss under geometric growth.

use crate::error::AnalyticsError;
use serde::Serialize;

/// Bernoulli's expected value (BEV) of paying `bet_size` out of `wealth` for
/// a ticket with equally likely `payoffs`.
///
/// The ending wealth for each payoff is `payoff + wealth - bet_size`; the BEV is
/// the geometric mean of those ending wealths. A BEV below `wealth` means the
/// wager shrinks expected compounded wealth.
pub fn bernoulli_expected_value(
    payoffs: &[f64],
    wealth: f64,
    bet_size: f64,
) -> Result<f64, AnalyticsError> {
    if payoffs.is_empty() {
        return Err(AnalyticsError::NotEnoughData(
            "a wager needs at least one payoff".to_string(),
        ));
    }
    if bet_size < 0.0 || bet_size > wealth {
        return Err(AnalyticsError::InvalidWager(format!(
            "bet size {} must be between 0 and wealth {}",
            bet_size, wealth
        )));
    }

    let mut log_sum = 0.0;
    for payoff in payoffs {
        let end_wealth = payoff + (wealth - bet_size);
        if !end_wealth.is_finite() || end_wealth <= 0.0 {
            return Err(AnalyticsError::Domain(format!(
                "ending wealth {} for payoff {} is not strictly positive",
                end_wealth, payoff
            )));
        }
        log_sum += end_wealth.ln();
    }
    Ok((log_sum / payoffs.len() as f64).exp())
}

/// Most coin flips a Petersburg lottery may run; `2^1023` is the largest power
/// of two an `f64` holds.
pub const MAX_PETERSBURG_ROUNDS: u32 = 1023;

/// Equally likely payoffs of a Petersburg lottery truncated after `rounds`
/// coin flips: `2, 4, 8, ..., 2^rounds`.
pub fn petersburg_payoffs(rounds: u32) -> Result<Vec<f64>, AnalyticsError> {
    if rounds > MAX_PETERSBURG_ROUNDS {
        return Err(AnalyticsError::InvalidWager(format!(
            "a Petersburg lottery is limited to {} rounds, got {}",
            MAX_PETERSBURG_ROUNDS, rounds
        )));
    }
    Ok((1..=rounds as i32).map(|k| 2f64.powi(k)).collect())
}

/// BEV for one bet size along a [`WagerCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WagerPoint {
    pub bet_size: u64,
    /// Bet size as a percentage of starting wealth.
    pub fraction_pct: f64,
    pub expected_value: f64,
}

/// BEV for every whole bet size from 0 to the full starting wealth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WagerCurve {
    pub wealth: u64,
    pub points: Vec<WagerPoint>,
    /// The point with the highest BEV; ties go to the smaller bet.
    pub best: WagerPoint,
}

impl WagerCurve {
    pub fn point_at(&self, bet_size: u64) -> Option<&WagerPoint> {
        self.points.get(usize::try_from(bet_size).ok()?)
    }
}

/// Computes the BEV curve over bet sizes `0..=wealth`.
pub fn wager_curve(payoffs: &[f64], wealth: u64) -> Result<WagerCurve, AnalyticsError> {
    if wealth == 0 {
        return Err(AnalyticsError::InvalidWager(
            "starting wealth must be positive".to_string(),
        ));
    }

    let total = wealth as f64;
    let points = (0..=wealth)
        .map(|bet| {
            Ok(WagerPoint {
                bet_size: bet,
                fraction_pct: bet as f64 / total * 100.0,
                expected_value: bernoulli_expected_value(payoffs, total, bet as f64)?,
            })
        })
        .collect::<Result<Vec<_>, AnalyticsError>>()?;

    let best = points
        .iter()
        .copied()
        .reduce(|best, p| if p.expected_value > best.expected_value { p } else { best })
        .ok_or_else(|| AnalyticsError::NotEnoughData("empty wager curve".to_string()))?;

    tracing::debug!(
        wealth,
        best_bet = best.bet_size,
        best_value = best.expected_value,
        "Computed wager curve"
    );

    Ok(WagerCurve {
        wealth,
        points,
        best,
    })
}

/// Gain in percent needed to get back to even after losing `loss_pct` percent.
///
/// `loss_pct` is negative (`-50.0` for a halving) and within `[-100, 0)`;
/// a total loss can never be recovered and yields `f64::INFINITY`.
pub fn recovery_percent(loss_pct: f64) -> Result<f64, AnalyticsError> {
    if !(-100.0..0.0).contains(&loss_pct) {
        return Err(AnalyticsError::Domain(format!(
            "loss {}% must be within [-100, 0)",
            loss_pct
        )));
    }
    if loss_pct == -100.0 {
        return Ok(f64::INFINITY);
    }
    Ok((1.0 / (1.0 + loss_pct / 100.0) - 1.0) * 100.0)
}

/// `(loss, recovery)` pairs for whole-percent losses from -100% to -1%.
pub fn recovery_curve() -> Vec<(i32, f64)> {
    (-100..0)
        .map(|loss| {
            let recovery = recovery_percent(f64::from(loss)).unwrap_or(f64::INFINITY);
            (loss, recovery)
        })
        .collect()
}
