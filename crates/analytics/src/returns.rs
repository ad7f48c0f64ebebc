//! Yearly index returns binned by [`ReturnRange`], and blends of the index
//! with a safe-haven asset whose payoff depends on the index's range.

use crate::blend::Ratio;
use crate::error::AnalyticsError;
use crate::stats::{geometric_mean, growth_return_pct, mean};
use chrono::NaiveDate;
use core_types::{CostBasis, ReturnRange, YearlyReturn};
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

/// Number of years that fell into one range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeCount {
    pub range: ReturnRange,
    pub count: usize,
}

/// Counts years per range, in category order. Empty ranges are kept with a zero count.
pub fn frequency_table(returns: &[YearlyReturn]) -> Vec<RangeCount> {
    let mut counts = [0usize; 5];
    for year in returns {
        counts[year.range().index()] += 1;
    }
    ReturnRange::ALL
        .into_iter()
        .map(|range| RangeCount {
            range,
            count: counts[range.index()],
        })
        .collect()
}

/// Spread of the total returns inside one range (fractional, 0.1 = +10%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeSummary {
    pub range: ReturnRange,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Min, max and mean total return of every non-empty range, sorted by mean ascending.
pub fn range_summaries(returns: &[YearlyReturn]) -> Result<Vec<RangeSummary>, AnalyticsError> {
    let groups = returns
        .iter()
        .map(|year| (year.range(), year.total_return()))
        .into_group_map();

    let mut summaries = Vec::with_capacity(groups.len());
    for range in ReturnRange::ALL {
        let Some(values) = groups.get(&range) else {
            continue;
        };
        let (min, max) = match values.iter().copied().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => continue,
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        summaries.push(RangeSummary {
            range,
            count: values.len(),
            min,
            max,
            mean: mean(values)?,
        });
    }
    summaries.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    Ok(summaries)
}

/// A store of value described by its payoff in each index return range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeHaven {
    pub title: String,
    /// Fractional payoff per range, in [`ReturnRange::ALL`] order.
    pub payoffs: [f64; 5],
}

impl SafeHaven {
    /// Requires exactly one payoff per return range.
    pub fn new(title: &str, payoffs: &[f64]) -> Result<Self, AnalyticsError> {
        let payoffs: [f64; 5] = payoffs.try_into().map_err(|_| {
            AnalyticsError::InvalidDistribution(format!(
                "safe haven '{}' needs exactly 5 payoffs, got {}",
                title,
                payoffs.len()
            ))
        })?;
        Ok(Self {
            title: title.to_string(),
            payoffs,
        })
    }

    pub fn payoff(&self, range: ReturnRange) -> f64 {
        self.payoffs[range.index()]
    }
}

/// One year of an index / safe-haven blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlendedYear {
    pub date: NaiveDate,
    pub price_return: f64,
    pub dividend_yield: f64,
    pub total_return: f64,
    pub return_range: ReturnRange,
    pub haven_payoff: f64,
    pub blended_return: f64,
}

/// Arithmetic and geometric average of a yearly series, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesAverages {
    pub arith_mean: f64,
    pub geom_mean: f64,
}

impl SeriesAverages {
    /// Averages of a blend. Every year must leave some wealth.
    fn of(returns: &[f64]) -> Result<Self, AnalyticsError> {
        let growth: Vec<f64> = returns.iter().map(|r| 1.0 + r).collect();
        Ok(Self {
            arith_mean: mean(returns)? * 100.0,
            geom_mean: (geometric_mean(&growth)? - 1.0) * 100.0,
        })
    }

    /// Averages of one leg held alone. A year losing everything (-100%) wipes
    /// the leg out, so its geometric mean is -100% instead of an error.
    fn of_leg(returns: &[f64]) -> Result<Self, AnalyticsError> {
        let growth: Vec<f64> = returns.iter().map(|r| 1.0 + r).collect();
        Ok(Self {
            arith_mean: mean(returns)? * 100.0,
            geom_mean: growth_return_pct(&growth)?,
        })
    }
}

/// The index blended year by year with a safe haven.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HavenBlend {
    pub title: String,
    pub ratio: [f64; 2],
    pub years: Vec<BlendedYear>,
    pub index: SeriesAverages,
    pub haven: SeriesAverages,
    pub blended: SeriesAverages,
}

impl HavenBlend {
    pub fn cost_against(&self, basis: CostBasis) -> f64 {
        match basis {
            CostBasis::BothLegs => {
                self.blended.arith_mean - self.index.arith_mean - self.haven.arith_mean
            }
            CostBasis::FirstLegOnly => self.blended.arith_mean - self.index.arith_mean,
        }
    }

    pub fn net_against(&self, basis: CostBasis) -> f64 {
        match basis {
            CostBasis::BothLegs => {
                self.blended.geom_mean - self.index.geom_mean - self.haven.geom_mean
            }
            CostBasis::FirstLegOnly => self.blended.geom_mean - self.index.geom_mean,
        }
    }
}

/// Blends each year's total index return with the haven's payoff for that
/// year's range: `ratio.first * total + ratio.second * payoff`.
pub fn blend_with_haven(
    returns: &[YearlyReturn],
    haven: &SafeHaven,
    ratio: Ratio,
) -> Result<HavenBlend, AnalyticsError> {
    if returns.is_empty() {
        return Err(AnalyticsError::NotEnoughData(
            "no yearly returns to blend".to_string(),
        ));
    }

    let years: Vec<BlendedYear> = returns
        .iter()
        .map(|year| {
            let total_return = year.total_return();
            let return_range = ReturnRange::classify(total_return);
            let haven_payoff = haven.payoff(return_range);
            BlendedYear {
                date: year.date,
                price_return: year.price_return,
                dividend_yield: year.dividend_yield,
                total_return,
                return_range,
                haven_payoff,
                blended_return: ratio.first() * total_return + ratio.second() * haven_payoff,
            }
        })
        .collect();

    let index: Vec<f64> = years.iter().map(|y| y.total_return).collect();
    let payoffs: Vec<f64> = years.iter().map(|y| y.haven_payoff).collect();
    let blended: Vec<f64> = years.iter().map(|y| y.blended_return).collect();

    let result = HavenBlend {
        title: haven.title.clone(),
        ratio: [ratio.first(), ratio.second()],
        index: SeriesAverages::of_leg(&index)?,
        haven: SeriesAverages::of_leg(&payoffs)?,
        blended: SeriesAverages::of(&blended)?,
        years,
    };

    tracing::debug!(
        haven = %result.title,
        years = result.years.len(),
        blended_geom = result.blended.geom_mean,
        "Blended index with safe haven"
    );

    Ok(result)
}
