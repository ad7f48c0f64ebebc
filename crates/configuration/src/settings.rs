use crate::error::ConfigError;
use core_types::CostBasis;
use serde::Deserialize;
use std::collections::HashSet;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub distributions: Vec<DistributionSettings>,
    pub blend: BlendSettings,
    #[serde(default)]
    pub sweep: SweepSettings,
    #[serde(default)]
    pub random_walk: RandomWalkSettings,
    #[serde(default)]
    pub wager: WagerSettings,
    #[serde(default)]
    pub safe_havens: Vec<SafeHavenSettings>,
}

/// A named bet: results and how often each occurs.
#[derive(Debug, Clone, Deserialize)]
pub struct DistributionSettings {
    pub name: String,
    /// Multiplicative outcomes, e.g. 1.5 for +50%.
    pub results: Vec<f64>,
    /// Kept as floats so a fractional weight reaches the distribution builder
    /// and is reported there, instead of failing as a type error.
    pub weights: Vec<f64>,
}

/// Which two distributions to blend, and how.
#[derive(Debug, Clone, Deserialize)]
pub struct BlendSettings {
    pub first: String,
    pub second: String,
    /// Shares of `first` and `second`, e.g. `[0.4, 0.6]`.
    pub ratio: Vec<f64>,
    #[serde(default)]
    pub cost_basis: CostBasis,
    /// Repeat every outcome of `second` this many times before pairing, so a
    /// coarse distribution lines up with a finer one.
    #[serde(default)]
    pub repeat_second: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepSettings {
    /// Spacing of the ratio grid; must divide 1.
    pub step: f64,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self { step: 0.01 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RandomWalkSettings {
    /// Distribution to walk; the blend's first leg when absent.
    pub distribution: Option<String>,
    pub num_walks: usize,
    pub num_rolls: usize,
    pub seed: u64,
    pub histogram_bins: usize,
}

impl Default for RandomWalkSettings {
    fn default() -> Self {
        Self {
            distribution: None,
            num_walks: 1_000,
            num_rolls: 300,
            seed: 42,
            histogram_bins: 30,
        }
    }
}

/// Longest Petersburg lottery that still has finite payoffs (`2^1023`).
pub const MAX_WAGER_ROUNDS: u32 = 1023;

/// A lottery ticket priced against a starting wealth.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WagerSettings {
    /// Equally likely payoffs; a Petersburg lottery of `rounds` flips when absent.
    pub payoffs: Option<Vec<f64>>,
    pub rounds: u32,
    pub wealth: u64,
    pub bet_size: u64,
}

impl Default for WagerSettings {
    fn default() -> Self {
        Self {
            payoffs: None,
            rounds: 20,
            wealth: 100_000,
            bet_size: 10_000,
        }
    }
}

/// A safe haven's payoff in each yearly index return range, lowest range first.
#[derive(Debug, Clone, Deserialize)]
pub struct SafeHavenSettings {
    pub title: String,
    pub payoffs: Vec<f64>,
}

impl Config {
    pub fn find_distribution(&self, name: &str) -> Option<&DistributionSettings> {
        self.distributions.iter().find(|d| d.name == name)
    }

    pub fn find_safe_haven(&self, title: &str) -> Option<&SafeHavenSettings> {
        self.safe_havens.iter().find(|h| h.title == title)
    }

    /// Checks the rules that span more than one field. Numeric rules of a single
    /// distribution or ratio are left to the analytics constructors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.distributions.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one [[distributions]] entry is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for dist in &self.distributions {
            if !seen.insert(dist.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "distribution '{}' is defined more than once",
                    dist.name
                )));
            }
        }

        for leg in [&self.blend.first, &self.blend.second] {
            if self.find_distribution(leg).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "blend refers to unknown distribution '{}'",
                    leg
                )));
            }
        }
        if self.blend.ratio.len() != 2 {
            return Err(ConfigError::ValidationError(format!(
                "blend.ratio needs exactly two shares, got {}",
                self.blend.ratio.len()
            )));
        }
        if self.blend.repeat_second == Some(0) {
            return Err(ConfigError::ValidationError(
                "blend.repeat_second must be at least 1".to_string(),
            ));
        }

        if !(self.sweep.step > 0.0 && self.sweep.step <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "sweep.step must be in (0, 1], got {}",
                self.sweep.step
            )));
        }

        let walk = &self.random_walk;
        if walk.num_walks == 0 || walk.num_rolls == 0 || walk.histogram_bins == 0 {
            return Err(ConfigError::ValidationError(
                "random_walk counts must all be positive".to_string(),
            ));
        }
        if let Some(name) = &walk.distribution {
            if self.find_distribution(name).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "random_walk refers to unknown distribution '{}'",
                    name
                )));
            }
        }

        if self.wager.payoffs.is_none()
            && (self.wager.rounds == 0 || self.wager.rounds > MAX_WAGER_ROUNDS)
        {
            return Err(ConfigError::ValidationError(format!(
                "wager.rounds must be in 1..={}, got {}",
                MAX_WAGER_ROUNDS, self.wager.rounds
            )));
        }
        if self.wager.wealth == 0 || self.wager.bet_size > self.wager.wealth {
            return Err(ConfigError::ValidationError(format!(
                "wager.bet_size {} must not exceed a positive wager.wealth {}",
                self.wager.bet_size, self.wager.wealth
            )));
        }

        for haven in &self.safe_havens {
            if haven.payoffs.len() != 5 {
                return Err(ConfigError::ValidationError(format!(
                    "safe haven '{}' needs 5 payoffs, got {}",
                    haven.title,
                    haven.payoffs.len()
                )));
            }
        }

        Ok(())
    }
}
