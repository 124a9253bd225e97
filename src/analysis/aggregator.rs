//! Aggregate views over the cleaned case table.
//!
//! This module provides the pure group-and-count reductions behind the
//! dashboard views. Every function is deterministic given the same input
//! rows regardless of their order; grouping keys with no rows are simply
//! absent from the output.

use crate::models::{
    AgeGroup, AgeGroupCount, CaseRecord, CumulativeCount, DailyCount, DistrictCount, Status,
    StatusCount,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Count cases per (onset date, status), sorted by date then status.
pub fn daily_status_counts(records: &[CaseRecord]) -> Vec<DailyCount> {
    let mut counts: BTreeMap<(NaiveDate, Status), usize> = BTreeMap::new();

    for record in records {
        *counts
            .entry((record.date_of_onset, record.status.clone()))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((date, status), cases)| DailyCount {
            date,
            status,
            cases,
        })
        .collect()
}

/// The daily view plus a per-status running total in date order.
///
/// Cumulative counts are monotonically non-decreasing per status.
pub fn cumulative_status_counts(records: &[CaseRecord]) -> Vec<CumulativeCount> {
    let mut running: BTreeMap<Status, usize> = BTreeMap::new();

    daily_status_counts(records)
        .into_iter()
        .map(|daily| {
            let total = running.entry(daily.status.clone()).or_default();
            *total += daily.cases;

            CumulativeCount {
                date: daily.date,
                status: daily.status,
                cases: daily.cases,
                cumulative_cases: *total,
            }
        })
        .collect()
}

/// Count cases per (district, status), sorted by district then status.
pub fn district_status_counts(records: &[CaseRecord]) -> Vec<DistrictCount> {
    let mut counts: BTreeMap<(String, Status), usize> = BTreeMap::new();

    for record in records {
        *counts
            .entry((record.district.clone(), record.status.clone()))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((district, status), cases)| DistrictCount {
            district,
            status,
            cases,
        })
        .collect()
}

/// Count confirmed cases per age group.
///
/// The confirmed-only condition is fixed; callers scope the input rows by
/// district and age-group selection before calling.
pub fn age_group_histogram(records: &[CaseRecord]) -> Vec<AgeGroupCount> {
    let mut counts: BTreeMap<AgeGroup, usize> = BTreeMap::new();

    for record in records {
        if record.status == Status::Confirmed {
            *counts.entry(record.age_group).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(age_group, cases)| AgeGroupCount { age_group, cases })
        .collect()
}

/// Count cases per status.
pub fn status_distribution(records: &[CaseRecord]) -> Vec<StatusCount> {
    let mut counts: BTreeMap<Status, usize> = BTreeMap::new();

    for record in records {
        *counts.entry(record.status.clone()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(status, cases)| StatusCount { status, cases })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(onset: (i32, u32, u32), age: u32, district: &str, status: Status) -> CaseRecord {
        let date_of_onset = NaiveDate::from_ymd_opt(onset.0, onset.1, onset.2).unwrap();
        CaseRecord {
            date_of_onset,
            date_of_sample: date_of_onset,
            age,
            age_group: AgeGroup::from_age(age),
            district: district.to_string(),
            status,
            time_to_sample: 0,
        }
    }

    fn sample_records() -> Vec<CaseRecord> {
        vec![
            record((2015, 1, 1), 25, "Kailahun", Status::Confirmed),
            record((2015, 1, 1), 30, "Kailahun", Status::Confirmed),
            record((2015, 1, 1), 45, "Kenema", Status::Suspected),
            record((2015, 1, 2), 70, "Kenema", Status::Confirmed),
            record((2015, 1, 3), 12, "Kailahun", Status::Suspected),
            record((2015, 1, 3), 15, "Kailahun", Status::Confirmed),
        ]
    }

    #[test]
    fn test_daily_counts_grouped_and_sorted() {
        let daily = daily_status_counts(&sample_records());

        assert_eq!(daily.len(), 5);
        assert_eq!(
            daily[0],
            DailyCount {
                date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
                status: Status::Confirmed,
                cases: 2,
            }
        );
        // Dates ascend across the output.
        for pair in daily.windows(2) {
            assert!(pair[0].date <= pair[1].date);
        }
    }

    #[test]
    fn test_daily_counts_are_order_insensitive() {
        let records = sample_records();
        let mut reversed = records.clone();
        reversed.reverse();

        assert_eq!(daily_status_counts(&records), daily_status_counts(&reversed));
    }

    #[test]
    fn test_cumulative_counts_are_monotonic_per_status() {
        let cumulative = cumulative_status_counts(&sample_records());

        let mut last: std::collections::HashMap<Status, usize> = Default::default();
        for row in &cumulative {
            let previous = last.insert(row.status.clone(), row.cumulative_cases);
            assert!(row.cumulative_cases >= previous.unwrap_or(0));
        }

        // Final totals match the plain per-status counts.
        let confirmed_total = cumulative
            .iter()
            .filter(|c| c.status == Status::Confirmed)
            .last()
            .unwrap()
            .cumulative_cases;
        assert_eq!(confirmed_total, 4);
    }

    #[test]
    fn test_district_counts() {
        let districts = district_status_counts(&sample_records());

        assert!(districts.contains(&DistrictCount {
            district: "Kailahun".to_string(),
            status: Status::Confirmed,
            cases: 3,
        }));
        assert!(districts.contains(&DistrictCount {
            district: "Kenema".to_string(),
            status: Status::Suspected,
            cases: 1,
        }));
        // No zero-filling: only the four (district, status) pairs that
        // actually occur are present.
        assert_eq!(districts.len(), 4);
    }

    #[test]
    fn test_age_histogram_counts_only_confirmed() {
        let histogram = age_group_histogram(&sample_records());

        assert_eq!(
            histogram,
            vec![
                AgeGroupCount {
                    age_group: AgeGroup::Child,
                    cases: 1,
                },
                AgeGroupCount {
                    age_group: AgeGroup::YoungAdult,
                    cases: 2,
                },
                AgeGroupCount {
                    age_group: AgeGroup::Senior,
                    cases: 1,
                },
            ]
        );
    }

    #[test]
    fn test_status_distribution() {
        let distribution = status_distribution(&sample_records());

        assert_eq!(
            distribution,
            vec![
                StatusCount {
                    status: Status::Confirmed,
                    cases: 4,
                },
                StatusCount {
                    status: Status::Suspected,
                    cases: 2,
                },
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_views() {
        assert!(daily_status_counts(&[]).is_empty());
        assert!(cumulative_status_counts(&[]).is_empty());
        assert!(district_status_counts(&[]).is_empty());
        assert!(age_group_histogram(&[]).is_empty());
        assert!(status_distribution(&[]).is_empty());
    }

    #[test]
    fn test_rerunning_yields_identical_output() {
        let records = sample_records();
        assert_eq!(
            cumulative_status_counts(&records),
            cumulative_status_counts(&records)
        );
        assert_eq!(
            district_status_counts(&records),
            district_status_counts(&records)
        );
    }
}
