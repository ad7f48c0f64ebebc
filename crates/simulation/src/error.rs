use analytics::AnalyticsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Simulation settings are invalid: {0}")]
    InvalidSettings(String),

    #[error("Cannot draw from an empty set of outcomes")]
    EmptyOutcomes,

    #[error("Statistics error: {0}")]
    Analytics(#[from] AnalyticsError),
}
