use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid outcome distribution: {0}")]
    InvalidDistribution(String),

    #[error("Invalid allocation ratio: {0}")]
    InvalidRatio(String),

    #[error("Outcome arrays must be paired elementwise, got lengths {left} and {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Value outside the domain of the calculation: {0}")]
    Domain(String),

    #[error("Invalid wager: {0}")]
    InvalidWager(String),

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),
}
