use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which unblended legs a blend's cost and net are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBasis {
    /// Subtract the means of both source distributions.
    #[default]
    BothLegs,
    /// Subtract only the first (risky) leg's means.
    FirstLegOnly,
}

/// Yearly total-return buckets used for index frequency tables.
///
/// Buckets are closed on the right: a return of exactly 0% lands in
/// `MinusFifteenToZero`, exactly 15% in `ZeroToFifteen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReturnRange {
    BelowMinusFifteen,
    MinusFifteenToZero,
    ZeroToFifteen,
    FifteenToThirty,
    AboveThirty,
}

impl ReturnRange {
    /// All buckets in category order.
    pub const ALL: [ReturnRange; 5] = [
        ReturnRange::BelowMinusFifteen,
        ReturnRange::MinusFifteenToZero,
        ReturnRange::ZeroToFifteen,
        ReturnRange::FifteenToThirty,
        ReturnRange::AboveThirty,
    ];

    /// Places a fractional return (0.12 = +12%) into its bucket.
    pub fn classify(total_return: f64) -> Self {
        if total_return <= -0.15 {
            ReturnRange::BelowMinusFifteen
        } else if total_return <= 0.0 {
            ReturnRange::MinusFifteenToZero
        } else if total_return <= 0.15 {
            ReturnRange::ZeroToFifteen
        } else if total_return <= 0.30 {
            ReturnRange::FifteenToThirty
        } else {
            ReturnRange::AboveThirty
        }
    }

    /// Position of the bucket in category order.
    pub fn index(&self) -> usize {
        match self {
            ReturnRange::BelowMinusFifteen => 0,
            ReturnRange::MinusFifteenToZero => 1,
            ReturnRange::ZeroToFifteen => 2,
            ReturnRange::FifteenToThirty => 3,
            ReturnRange::AboveThirty => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReturnRange::BelowMinusFifteen => "< -15%",
            ReturnRange::MinusFifteenToZero => "-15% to 0%",
            ReturnRange::ZeroToFifteen => "0% to 15%",
            ReturnRange::FifteenToThirty => "15% to 30%",
            ReturnRange::AboveThirty => "> 30%",
        }
    }
}

impl fmt::Display for ReturnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReturnRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReturnRange::ALL
            .into_iter()
            .find(|range| range.label() == s.trim())
            .ok_or_else(|| CoreError::InvalidInput("return range".to_string(), s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_right_closed() {
        assert_eq!(ReturnRange::classify(-0.15), ReturnRange::BelowMinusFifteen);
        assert_eq!(ReturnRange::classify(-0.1499), ReturnRange::MinusFifteenToZero);
        assert_eq!(ReturnRange::classify(0.0), ReturnRange::MinusFifteenToZero);
        assert_eq!(ReturnRange::classify(0.15), ReturnRange::ZeroToFifteen);
        assert_eq!(ReturnRange::classify(0.30), ReturnRange::FifteenToThirty);
        assert_eq!(ReturnRange::classify(0.31), ReturnRange::AboveThirty);
    }

    #[test]
    fn test_labels_parse_back() {
        for range in ReturnRange::ALL {
            assert_eq!(range.label().parse::<ReturnRange>().unwrap(), range);
        }
        assert!("between".parse::<ReturnRange>().is_err());
    }

    #[test]
    fn test_index_matches_category_order() {
        for (i, range) in ReturnRange::ALL.iter().enumerate() {
            assert_eq!(range.index(), i);
        }
    }

    #[test]
    fn test_cost_basis_defaults_to_both_legs() {
        assert_eq!(CostBasis::default(), CostBasis::BothLegs);
        let parsed: CostBasis = serde_json::from_str("\"first_leg_only\"").unwrap();
        assert_eq!(parsed, CostBasis::FirstLegOnly);
    }
}
