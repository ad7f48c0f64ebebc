//! Terminal tables and CSV side files for the CLI.

use analytics::returns::{RangeCount, RangeSummary};
use analytics::sweep::OptimalRatio;
use analytics::wager::{WagerCurve, WagerPoint};
use analytics::{HavenBlend, KellyReport, OutcomeDistribution};
use comfy_table::Table;
use simulation::Histogram;
use std::io::{self, Write};

/// Header of the CSV written for an index / safe-haven blend.
pub const HAVEN_CSV_HEADER: &str =
    "date,price_return,dividend_yield,total_return,return_range,haven_payoff,blended_return";

pub fn pct(value: f64) -> String {
    format!("{:.2}%", value)
}

pub fn distribution_table(dist: &OutcomeDistribution) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Outcome", "Return", "Count"]);
    for (value, count) in analytics::stats::distinct_counts(dist.outcomes()) {
        table.add_row(vec![
            format!("{}", value),
            pct(core_types::to_percent(value)),
            count.to_string(),
        ]);
    }
    table
}

pub fn report_table(report: &KellyReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["", "ARITHM AVG", "GEOM AVG"]);
    for row in report.rows() {
        table.add_row(vec![row.label.clone(), pct(row.arith_avg), pct(row.geom_avg)]);
    }
    table
}

pub fn curve_table(optimal: &OptimalRatio) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Share of first", "ARITHM AVG", "GEOM AVG", ""]);
    for point in &optimal.curve {
        let marker = if point.ratio == optimal.ratio { "<- optimal" } else { "" };
        table.add_row(vec![
            pct(point.ratio * 100.0),
            pct(point.arith_mean),
            pct(point.geom_mean),
            marker.to_string(),
        ]);
    }
    table
}

pub fn histogram_table(histogram: &Histogram) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Geometric average return", "Walks"]);
    for bin in &histogram.bins {
        table.add_row(vec![
            format!("{:.2}% .. {:.2}%", bin.lower, bin.upper),
            bin.count.to_string(),
        ]);
    }
    table
}

pub fn wager_table(curve: &WagerCurve, chosen: &WagerPoint) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["", "Bet", "Fraction of wealth", "Bernoulli EV"]);
    for (label, point) in [("chosen", chosen), ("best", &curve.best)] {
        table.add_row(vec![
            label.to_string(),
            point.bet_size.to_string(),
            pct(point.fraction_pct),
            format!("{:.2}", point.expected_value),
        ]);
    }
    table
}

pub fn frequency_table(counts: &[RangeCount]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Yearly return", "Frequency"]);
    for row in counts {
        table.add_row(vec![row.range.label().to_string(), row.count.to_string()]);
    }
    table
}

pub fn summaries_table(summaries: &[RangeSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Yearly return", "Years", "Min", "Mean", "Max"]);
    for s in summaries {
        table.add_row(vec![
            s.range.label().to_string(),
            s.count.to_string(),
            pct(s.min * 100.0),
            pct(s.mean * 100.0),
            pct(s.max * 100.0),
        ]);
    }
    table
}

pub fn haven_table(blend: &HavenBlend, basis: core_types::CostBasis) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["", "ARITHM AVG", "GEOM AVG"]);
    for (label, averages) in [
        ("index", &blend.index),
        (blend.title.as_str(), &blend.haven),
        ("combined", &blend.blended),
    ] {
        table.add_row(vec![
            label.to_string(),
            pct(averages.arith_mean),
            pct(averages.geom_mean),
        ]);
    }
    table.add_row(vec![
        "net/cost".to_string(),
        pct(blend.cost_against(basis)),
        pct(blend.net_against(basis)),
    ]);
    table
}

/// Writes every blended year as a comma separated row under [`HAVEN_CSV_HEADER`].
pub fn write_haven_csv<W: Write>(writer: W, blend: &HavenBlend) -> io::Result<()> {
    let mut writer = io::BufWriter::new(writer);
    writeln!(writer, "{}", HAVEN_CSV_HEADER)?;
    for year in &blend.years {
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            year.date,
            year.price_return,
            year.dividend_yield,
            year.total_return,
            year.return_range.label(),
            year.haven_payoff,
            year.blended_return,
        )?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::{Ratio, SafeHaven, blend_with_haven};
    use chrono::NaiveDate;
    use core_types::YearlyReturn;

    #[test]
    fn test_haven_csv_has_header_and_one_row_per_year() {
        let returns = vec![
            YearlyReturn::new(NaiveDate::from_ymd_opt(2008, 1, 1).unwrap(), -0.38, 0.02),
            YearlyReturn::new(NaiveDate::from_ymd_opt(2009, 1, 1).unwrap(), 0.23, 0.03),
        ];
        let haven = SafeHaven::new("Insurance", &[4.0, 0.5, -0.5, -0.5, -0.5]).unwrap();
        let blend = blend_with_haven(&returns, &haven, Ratio::new(0.9, 0.1).unwrap()).unwrap();

        let mut buffer = Vec::new();
        write_haven_csv(&mut buffer, &blend).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HAVEN_CSV_HEADER);
        assert!(lines[1].starts_with("2008-01-01,-0.38,0.02,"));
        assert!(lines[1].contains(",< -15%,4,"));
        for line in &lines {
            assert_eq!(line.split(',').count(), 7);
        }
    }

    #[test]
    fn test_report_table_lists_four_rows() {
        let dice = OutcomeDistribution::new("dice_roll", &[0.5, 1.05, 1.5], &[1, 4, 1]).unwrap();
        let cash = OutcomeDistribution::new("cash", &[1.0], &[6]).unwrap();
        let blend = analytics::combine(&dice, &cash, Ratio::new(0.4, 0.6).unwrap()).unwrap();
        let rendered = report_table(&KellyReport::from_blend(&blend)).to_string();
        for label in ["dice_roll", "cash", "combined", "net/cost"] {
            assert!(rendered.contains(label));
        }
    }

    #[test]
    fn test_pct_formats_two_decimals() {
        assert_eq!(pct(-13.3974), "-13.40%");
        assert_eq!(pct(0.0), "0.00%");
    }
}
