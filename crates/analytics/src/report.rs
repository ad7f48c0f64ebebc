use crate::blend::BlendedOutcome;
use core_types::CostBasis;
use serde::{Deserialize, Serialize};

/// One row of a [`KellyReport`]: an arithmetic and a geometric average, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub label: String,
    pub arith_avg: f64,
    pub geom_avg: f64,
}

/// The summary table behind a Kelly-criterion chart.
///
/// Rows are the first leg, the second leg, the blend, and the cost/net row
/// (arithmetic cost in `arith_avg`, geometric net in `geom_avg`). The report is
/// built from a blend and handed to whoever renders it; nothing is shared globally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KellyReport {
    pub first: ReportRow,
    pub second: ReportRow,
    pub combined: ReportRow,
    pub net_cost: ReportRow,
    pub ratio: [f64; 2],
    pub cost_basis: CostBasis,
}

impl KellyReport {
    /// Builds the report with cost and net measured against both legs.
    pub fn from_blend(blend: &BlendedOutcome) -> Self {
        Self::with_basis(blend, CostBasis::BothLegs)
    }

    pub fn with_basis(blend: &BlendedOutcome, basis: CostBasis) -> Self {
        let first = blend.first();
        let second = blend.second();
        Self {
            first: ReportRow {
                label: first.name.clone(),
                arith_avg: first.arith_mean,
                geom_avg: first.geom_mean,
            },
            second: ReportRow {
                label: second.name.clone(),
                arith_avg: second.arith_mean,
                geom_avg: second.geom_mean,
            },
            combined: ReportRow {
                label: "combined".to_string(),
                arith_avg: blend.arith_mean(),
                geom_avg: blend.geom_mean(),
            },
            net_cost: ReportRow {
                label: "net/cost".to_string(),
                arith_avg: blend.cost_against(basis),
                geom_avg: blend.net_against(basis),
            },
            ratio: [blend.ratio().first(), blend.ratio().second()],
            cost_basis: basis,
        }
    }

    /// The rows in display order.
    pub fn rows(&self) -> [&ReportRow; 4] {
        [&self.first, &self.second, &self.combined, &self.net_cost]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::{Ratio, combine};
    use crate::distribution::OutcomeDistribution;

    #[test]
    fn test_report_rows_follow_blend() {
        let dice = OutcomeDistribution::new("dice_roll", &[0.5, 1.05, 1.5], &[1, 4, 1]).unwrap();
        let cash = OutcomeDistribution::new("cash", &[1.0], &[6]).unwrap();
        let blend = combine(&dice, &cash, Ratio::new(0.4, 0.6).unwrap()).unwrap();

        let report = KellyReport::from_blend(&blend);
        let labels: Vec<&str> = report.rows().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["dice_roll", "cash", "combined", "net/cost"]);
        assert_eq!(report.first.geom_avg, dice.geom_mean());
        assert_eq!(report.net_cost.arith_avg, blend.cost());
        assert_eq!(report.net_cost.geom_avg, blend.net());
        assert_eq!(report.ratio, [0.4, 0.6]);
    }

    #[test]
    fn test_report_with_first_leg_basis() {
        let dice = OutcomeDistribution::new("dice_roll", &[0.5, 1.05, 1.5], &[1, 4, 1]).unwrap();
        let bond = OutcomeDistribution::new("bond", &[1.03], &[6]).unwrap();
        let blend = combine(&dice, &bond, Ratio::new(0.5, 0.5).unwrap()).unwrap();

        let report = KellyReport::with_basis(&blend, CostBasis::FirstLegOnly);
        assert_eq!(report.cost_basis, CostBasis::FirstLegOnly);
        assert_eq!(
            report.net_cost.arith_avg,
            blend.cost_against(CostBasis::FirstLegOnly)
        );
    }
}
