//! Random walks of repeated bets.
//!
//! - [`random_walk`]: compound `num_rolls` random draws per walk and summarize
//!   the spread of ending wealth
//! - [`histogram`]: equal-width frequency tables for the per-walk results

pub mod error;
pub mod histogram;
pub mod random_walk;

pub use error::SimulationError;
pub use histogram::{Histogram, HistogramBin, histogram, interval};
pub use random_walk::{RandomWalk, RandomWalkResult, WalkSettings};
