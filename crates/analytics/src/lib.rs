//! # Haven Analytics Engine
//!
//! This crate computes the statistics behind the Kelly-criterion and safe-haven
//! illustrations: weighted outcome distributions, their arithmetic and geometric
//! mean returns, and what happens to those means when two distributions are
//! blended under an allocation ratio.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files,
//!   terminals or charts. It depends only on `core-types` (Layer 0).
//! - **Immutable Values:** `OutcomeDistribution` and `BlendedOutcome` compute
//!   everything at construction and expose read-only accessors. Calling a
//!   constructor twice with the same input yields bit-identical values.
//!
//! ## Public API
//!
//! - `OutcomeDistribution`: a named bet built from results and integer weights.
//! - `BlendedOutcome` / `combine`: two distributions mixed under a `Ratio`, with
//!   the arithmetic `cost` and geometric `net` of blending.
//! - `find_optimal_ratio`: the Kelly-optimal share found by sweeping the ratio.
//! - `KellyReport`: the summary table of a blend.
//! - `wager` and `returns`: Bernoulli expected value, loss recovery, and yearly
//!   index returns blended with a safe haven.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod blend;
pub mod distribution;
pub mod error;
pub mod report;
pub mod returns;
pub mod stats;
pub mod sweep;
pub mod wager;

// Re-export the key components to create a clean, public-facing API.
pub use blend::{BlendedOutcome, Leg, Ratio, blend_outcomes, combine};
pub use distribution::OutcomeDistribution;
pub use error::AnalyticsError;
pub use report::{KellyReport, ReportRow};
pub use returns::{HavenBlend, SafeHaven, blend_with_haven, frequency_table, range_summaries};
pub use sweep::{CurvePoint, OptimalRatio, RatioCurve, find_optimal_ratio};
