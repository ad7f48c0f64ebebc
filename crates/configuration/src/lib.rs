use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    BlendSettings, Config, DistributionSettings, MAX_WAGER_ROUNDS, RandomWalkSettings,
    SafeHavenSettings, SweepSettings, WagerSettings,
};

/// Prefix of environment variables that override file settings,
/// e.g. `HAVEN__SWEEP__STEP=0.05`.
pub const ENV_PREFIX: &str = "HAVEN";

/// Loads the application configuration from a TOML file.
///
/// This function is the primary entry point for this crate. It reads the configuration file,
/// overlays `HAVEN__*` environment variables, deserializes the result into our
/// strongly-typed `Config` struct and validates it.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    finish(builder)
}

/// Parses configuration from TOML text, without environment overrides.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        distributions = config.distributions.len(),
        safe_havens = config.safe_havens.len(),
        "Configuration loaded"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::CostBasis;

    const SAMPLE: &str = r#"
        [[distributions]]
        name = "dice_roll"
        results = [0.5, 1.05, 1.5]
        weights = [1, 4, 1]

        [[distributions]]
        name = "cash"
        results = [1.0]
        weights = [1]

        [blend]
        first = "dice_roll"
        second = "cash"
        ratio = [0.4, 0.6]
        repeat_second = 6
    "#;

    #[test]
    fn test_parse_with_defaults() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.distributions.len(), 2);
        assert_eq!(config.distributions[0].weights, vec![1.0, 4.0, 1.0]);
        assert_eq!(config.blend.cost_basis, CostBasis::BothLegs);
        assert_eq!(config.blend.repeat_second, Some(6));
        assert_eq!(config.sweep.step, 0.01);
        assert_eq!(config.random_walk.num_walks, 1_000);
        assert_eq!(config.wager.wealth, 100_000);
        assert!(config.safe_havens.is_empty());
        assert!(config.find_distribution("cash").is_some());
    }

    #[test]
    fn test_cost_basis_and_sections_override_defaults() {
        let toml = format!(
            "{}\n{}",
            SAMPLE.replace("repeat_second = 6", "repeat_second = 6\ncost_basis = \"first_leg_only\""),
            r#"
            [sweep]
            step = 0.05

            [random_walk]
            num_walks = 50
            seed = 7

            [[safe_havens]]
            title = "Gold"
            payoffs = [0.1, 0.05, 0.02, 0.0, -0.05]
            "#
        );
        let config = parse_config(&toml).unwrap();
        assert_eq!(config.blend.cost_basis, CostBasis::FirstLegOnly);
        assert_eq!(config.sweep.step, 0.05);
        assert_eq!(config.random_walk.num_walks, 50);
        assert_eq!(config.random_walk.num_rolls, 300);
        assert_eq!(config.random_walk.seed, 7);
        assert_eq!(config.find_safe_haven("Gold").unwrap().payoffs.len(), 5);
    }

    #[test]
    fn test_unknown_blend_leg_is_rejected() {
        let toml = SAMPLE.replace("second = \"cash\"", "second = \"gold\"");
        assert!(matches!(
            parse_config(&toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_ratio_shape_is_validated() {
        let toml = SAMPLE.replace("ratio = [0.4, 0.6]", "ratio = [1.0]");
        assert!(matches!(
            parse_config(&toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_wager_rounds_are_bounded() {
        for rounds in [0, 1024, u32::MAX] {
            let toml = format!("{}\n[wager]\nrounds = {}\n", SAMPLE, rounds);
            assert!(
                matches!(parse_config(&toml), Err(ConfigError::ValidationError(_))),
                "rounds {} should be rejected",
                rounds
            );
        }
        let toml = format!("{}\n[wager]\nrounds = 1023\n", SAMPLE);
        assert_eq!(parse_config(&toml).unwrap().wager.rounds, 1023);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let toml = SAMPLE.replace("name = \"cash\"", "name = \"dice_roll\"");
        assert!(matches!(
            parse_config(&toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_missing_blend_section_fails_to_load() {
        let toml = SAMPLE.split("[blend]").next().unwrap();
        assert!(matches!(parse_config(toml), Err(ConfigError::LoadError(_))));
    }
}
