use crate::error::SimulationError;
use analytics::stats::{growth_return_pct, percentile_of_sorted};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// How many walks to run, how long each is, and where the random stream starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WalkSettings {
    pub num_walks: usize,
    pub num_rolls: usize,
    pub seed: u64,
}

/// Everything a random-walk chart needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandomWalkResult {
    /// Wealth after each roll, one row per walk, starting from 1.0.
    pub walks: Vec<Vec<f64>>,
    /// 5th percentile of wealth at each roll.
    pub p5: Vec<f64>,
    /// Median wealth at each roll.
    pub median: Vec<f64>,
    /// 95th percentile of wealth at each roll.
    pub p95: Vec<f64>,
    /// Geometric mean return of the outcomes themselves, in percent.
    pub median_return: f64,
    /// Realized geometric average return of each walk, in percent.
    pub geom_returns: Vec<f64>,
}

impl RandomWalkResult {
    /// The median wealth path across all walks.
    pub fn median_walk(&self) -> &[f64] {
        &self.median
    }
}

/// Repeatedly bets the whole bankroll on a uniformly drawn outcome.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    outcomes: Vec<f64>,
    settings: WalkSettings,
    median_return: f64,
}

impl RandomWalk {
    pub fn new(outcomes: &[f64], settings: WalkSettings) -> Result<Self, SimulationError> {
        if outcomes.is_empty() {
            return Err(SimulationError::EmptyOutcomes);
        }
        if settings.num_walks == 0 || settings.num_rolls == 0 {
            return Err(SimulationError::InvalidSettings(format!(
                "need at least one walk and one roll, got {} walks of {} rolls",
                settings.num_walks, settings.num_rolls
            )));
        }
        // Checked before any draw: a negative outcome would flip wealth's sign.
        let median_return = growth_return_pct(outcomes)?;
        Ok(Self {
            outcomes: outcomes.to_vec(),
            settings,
            median_return,
        })
    }

    /// Runs every walk. Walk `i` uses its own generator seeded with `seed + i`,
    /// so a walk's path does not depend on how many walks run alongside it.
    pub fn run(&self) -> Result<RandomWalkResult, SimulationError> {
        let WalkSettings {
            num_walks,
            num_rolls,
            seed,
        } = self.settings;

        let walks: Vec<Vec<f64>> = (0..num_walks)
            .map(|i| {
                let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
                self.walk(&mut rng)
            })
            .collect();

        let mut p5 = Vec::with_capacity(num_rolls);
        let mut median = Vec::with_capacity(num_rolls);
        let mut p95 = Vec::with_capacity(num_rolls);
        let mut column = Vec::with_capacity(num_walks);
        for step in 0..num_rolls {
            column.clear();
            column.extend(walks.iter().map(|w| w[step]));
            column.sort_by(f64::total_cmp);
            p5.push(percentile_of_sorted(&column, 5.0));
            median.push(percentile_of_sorted(&column, 50.0));
            p95.push(percentile_of_sorted(&column, 95.0));
        }

        let exponent = 1.0 / num_rolls as f64;
        let geom_returns = walks
            .iter()
            .map(|w| (w[num_rolls - 1].powf(exponent) - 1.0) * 100.0)
            .collect();

        let median_return = self.median_return;

        tracing::debug!(
            num_walks,
            num_rolls,
            seed,
            median_return,
            final_median = median.last().copied().unwrap_or(f64::NAN),
            "Random walks complete"
        );

        Ok(RandomWalkResult {
            walks,
            p5,
            median,
            p95,
            median_return,
            geom_returns,
        })
    }

    fn walk(&self, rng: &mut SmallRng) -> Vec<f64> {
        let mut wealth = 1.0;
        (0..self.settings.num_rolls)
            .map(|_| {
                wealth *= self.outcomes[rng.random_range(0..self.outcomes.len())];
                wealth
            })
            .collect()
    }
}
