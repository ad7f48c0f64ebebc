use crate::enums::ReturnRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rescales a multiplicative outcome (1.05) to a percentage return (5.0).
pub fn to_percent(outcome: f64) -> f64 {
    (outcome - 1.0) * 100.0
}

/// One year of index performance: price change plus dividend yield, both fractional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyReturn {
    pub date: NaiveDate,
    pub price_return: f64,
    pub dividend_yield: f64,
}

impl YearlyReturn {
    pub fn new(date: NaiveDate, price_return: f64, dividend_yield: f64) -> Self {
        Self {
            date,
            price_return,
            dividend_yield,
        }
    }

    pub fn total_return(&self) -> f64 {
        self.price_return + self.dividend_yield
    }

    pub fn range(&self) -> ReturnRange {
        ReturnRange::classify(self.total_return())
    }
}
