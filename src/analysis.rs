//! Interval performance analysis.
//!
//! For each (company, year) pair, takes the observations whose month-day
//! falls inside the recurring interval, and measures the percentage change
//! between the opening price of the first such day and the closing price of
//! the last. Aggregates a per-company mean and a direction label.

use std::collections::BTreeMap;

use crate::interval::CalendarInterval;
use crate::models::{
    AggregateRow, AnalysisReport, PivotTable, PriceObservation, Trend, YearlyChangeRecord,
};

/// Runs the interval analysis over the full observation set.
///
/// Returns `None` when no (company, year) group has at least two in-range
/// observations with a usable opening price. That is an ordinary outcome,
/// not an error; callers skip the analysis report in that case.
///
/// Pure and deterministic: same inputs, same output, no I/O.
pub fn analyze(
    observations: &[PriceObservation],
    interval: &CalendarInterval,
) -> Option<AnalysisReport> {
    // Grouping by (company, year) with a BTreeMap visits groups in sorted
    // key order, so pivot columns come out alphabetical by company.
    let mut groups: BTreeMap<(String, i32), Vec<&PriceObservation>> = BTreeMap::new();
    for obs in observations {
        groups
            .entry((obs.company.clone(), obs.year()))
            .or_default()
            .push(obs);
    }

    let mut records = Vec::new();
    for ((company, year), mut group) in groups {
        // First/last must be selected by date, not by arrival order.
        group.sort_by_key(|obs| obs.date);
        group.retain(|obs| interval.contains(obs.date));

        if group.len() < 2 {
            continue;
        }

        let open_first = group.first().and_then(|obs| obs.open);
        let close_last = group.last().and_then(|obs| obs.close);

        // Missing, NaN, or zero open would make the change undefined.
        let (Some(open_first), Some(close_last)) = (open_first, close_last) else {
            continue;
        };
        if open_first.is_nan() || open_first == 0.0 {
            continue;
        }

        let pct_change = (close_last - open_first) / open_first * 100.0;
        records.push(YearlyChangeRecord {
            company,
            year,
            pct_change,
        });
    }

    if records.is_empty() {
        return None;
    }

    let pivot = PivotTable::from_records(&records);
    let aggregates = aggregate(&records);

    Some(AnalysisReport {
        records,
        pivot,
        aggregates,
    })
}

/// Mean percentage change per company, in pivot column order, with the
/// direction label. A mean of exactly zero counts as `Decreased`.
fn aggregate(records: &[YearlyChangeRecord]) -> Vec<AggregateRow> {
    let mut order: Vec<&str> = Vec::new();
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in records {
        if !sums.contains_key(record.company.as_str()) {
            order.push(record.company.as_str());
        }
        let entry = sums.entry(record.company.as_str()).or_insert((0.0, 0));
        entry.0 += record.pct_change;
        entry.1 += 1;
    }

    order
        .into_iter()
        .map(|company| {
            let (sum, count) = sums[company];
            let avg_pct_change = sum / count as f64;
            let trend = if avg_pct_change > 0.0 {
                Trend::Increased
            } else {
                Trend::Decreased
            };
            AggregateRow {
                company: company.to_string(),
                avg_pct_change,
                trend,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::parse_interval;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn obs(company: &str, date: &str, open: f64, close: f64) -> PriceObservation {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        PriceObservation {
            company: company.to_string(),
            date,
            open: Some(open),
            high: Some(open.max(close)),
            low: Some(open.min(close)),
            close: Some(close),
            volume: Some(1_000),
        }
    }

    #[test]
    fn computes_change_from_first_open_to_last_close() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let observations = vec![
            obs("X", "2023-01-02", 100.0, 101.0),
            obs("X", "2023-01-10", 105.0, 110.0),
        ];

        let report = analyze(&observations, &interval).unwrap();
        assert_eq!(report.records.len(), 1);
        let record = &report.records[0];
        assert_eq!(record.company, "X");
        assert_eq!(record.year, 2023);
        assert_relative_eq!(record.pct_change, 10.0);
    }

    #[test]
    fn single_observation_group_yields_no_record() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let observations = vec![obs("Y", "2022-01-05", 50.0, 55.0)];
        assert!(analyze(&observations, &interval).is_none());
    }

    #[test]
    fn exactly_two_observations_qualify() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let observations = vec![
            obs("Y", "2022-01-05", 50.0, 55.0),
            obs("Y", "2022-01-06", 55.0, 60.0),
        ];
        let report = analyze(&observations, &interval).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_relative_eq!(report.records[0].pct_change, 20.0);
    }

    #[test]
    fn zero_open_skips_group() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let observations = vec![
            obs("Z", "2022-01-03", 0.0, 10.0),
            obs("Z", "2022-01-04", 10.0, 12.0),
        ];
        assert!(analyze(&observations, &interval).is_none());
    }

    #[test]
    fn missing_open_skips_group() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let mut first = obs("Z", "2022-01-03", 1.0, 10.0);
        first.open = None;
        let observations = vec![first, obs("Z", "2022-01-04", 10.0, 12.0)];
        assert!(analyze(&observations, &interval).is_none());
    }

    #[test]
    fn nan_open_skips_group() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let mut first = obs("Z", "2022-01-03", 1.0, 10.0);
        first.open = Some(f64::NAN);
        let observations = vec![first, obs("Z", "2022-01-04", 10.0, 12.0)];
        assert!(analyze(&observations, &interval).is_none());
    }

    #[test]
    fn unsorted_input_still_uses_earliest_open_and_latest_close() {
        let interval = parse_interval("01-01,01-31").unwrap();
        let observations = vec![
            obs("X", "2023-01-20", 105.0, 110.0),
            obs("X", "2023-01-02", 100.0, 101.0),
        ];
        let report = analyze(&observations, &interval).unwrap();
        assert_relative_eq!(report.records[0].pct_change, 10.0);
    }

    #[test]
    fn out_of_range_observations_are_ignored() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let observations = vec![
            obs("X", "2023-01-02", 100.0, 101.0),
            obs("X", "2023-01-10", 105.0, 110.0),
            // Outside the window; would change the result if counted.
            obs("X", "2023-02-01", 200.0, 300.0),
        ];
        let report = analyze(&observations, &interval).unwrap();
        assert_relative_eq!(report.records[0].pct_change, 10.0);
    }

    #[test]
    fn years_are_grouped_independently() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let observations = vec![
            obs("X", "2022-01-03", 100.0, 100.0),
            obs("X", "2022-01-10", 100.0, 120.0),
            obs("X", "2023-01-03", 100.0, 100.0),
            obs("X", "2023-01-10", 100.0, 90.0),
        ];
        let report = analyze(&observations, &interval).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.pivot.years, vec![2022, 2023]);
        assert_relative_eq!(report.pivot.get(2022, "X").unwrap(), 20.0);
        assert_relative_eq!(report.pivot.get(2023, "X").unwrap(), -10.0);
    }

    #[test]
    fn zero_mean_is_labeled_decreased() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let observations = vec![
            obs("X", "2022-01-03", 100.0, 100.0),
            obs("X", "2022-01-10", 100.0, 100.0),
        ];
        let report = analyze(&observations, &interval).unwrap();
        assert_relative_eq!(report.aggregates[0].avg_pct_change, 0.0);
        assert_eq!(report.aggregates[0].trend, Trend::Decreased);
    }

    #[test]
    fn aggregates_label_direction_per_company() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let observations = vec![
            obs("X", "2022-01-03", 100.0, 100.0),
            obs("X", "2022-01-10", 100.0, 110.0),
            obs("Z", "2022-01-03", 100.0, 100.0),
            obs("Z", "2022-01-10", 100.0, 95.0),
        ];
        let report = analyze(&observations, &interval).unwrap();

        assert_eq!(report.pivot.years, vec![2022]);
        assert_eq!(report.pivot.companies, vec!["X".to_string(), "Z".to_string()]);

        assert_eq!(report.aggregates.len(), 2);
        let x = &report.aggregates[0];
        assert_eq!(x.company, "X");
        assert_relative_eq!(x.avg_pct_change, 10.0);
        assert_eq!(x.trend, Trend::Increased);

        let z = &report.aggregates[1];
        assert_eq!(z.company, "Z");
        assert_relative_eq!(z.avg_pct_change, -5.0);
        assert_eq!(z.trend, Trend::Decreased);
    }

    #[test]
    fn mean_spans_all_qualifying_years() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let observations = vec![
            obs("X", "2021-01-03", 100.0, 100.0),
            obs("X", "2021-01-10", 100.0, 130.0),
            obs("X", "2022-01-03", 100.0, 100.0),
            obs("X", "2022-01-10", 100.0, 110.0),
        ];
        let report = analyze(&observations, &interval).unwrap();
        assert_relative_eq!(report.aggregates[0].avg_pct_change, 20.0);
    }

    #[test]
    fn wrap_interval_matches_nothing_within_a_year() {
        // December observations plus January of the next calendar year; the
        // January rows belong to the next year's group, and the December
        // rows fail the non-wrapping range check.
        let interval = crate::interval::CalendarInterval {
            start: crate::interval::MonthDay { month: 12, day: 20 },
            end: crate::interval::MonthDay { month: 1, day: 5 },
        };
        let observations = vec![
            obs("X", "2022-12-21", 100.0, 101.0),
            obs("X", "2022-12-28", 101.0, 102.0),
            obs("X", "2023-01-03", 102.0, 103.0),
            obs("X", "2023-01-04", 103.0, 104.0),
        ];
        assert!(analyze(&observations, &interval).is_none());
    }

    #[test]
    fn empty_input_is_empty_outcome() {
        let interval = parse_interval("01-01,01-15").unwrap();
        assert!(analyze(&[], &interval).is_none());
    }

    #[test]
    fn analysis_is_deterministic() {
        let interval = parse_interval("01-01,01-15").unwrap();
        let observations = vec![
            obs("X", "2022-01-03", 100.0, 103.0),
            obs("X", "2022-01-10", 103.0, 108.0),
            obs("Y", "2022-01-04", 50.0, 49.0),
            obs("Y", "2022-01-11", 49.0, 48.0),
        ];
        let first = analyze(&observations, &interval).unwrap();
        let second = analyze(&observations, &interval).unwrap();
        assert_eq!(first, second);
    }
}
