//! Cleaning pass over the raw line list.
//!
//! Turns raw rows into the immutable cleaned table: parses dates, drops
//! inconsistent records, imputes missing ages with the median, derives the
//! age group and the days-to-sample metric. The cleaned table is built
//! once at startup and never mutated afterwards.

use crate::dataset::loader::RawCase;
use crate::models::{AgeGroup, CaseRecord, CleaningSummary, Status};
use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::debug;

/// Try each configured format in order; the first match wins.
pub fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Median of the given ages. Returns `None` for an empty slice; an even
/// count averages the two middle values.
fn median_age(ages: &[f64]) -> Option<f64> {
    if ages.is_empty() {
        return None;
    }

    let mut sorted = ages.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Clean the raw table into case records.
///
/// Row-dropping policy is explicit null-exclusion: a row is removed when
/// either date is missing or unparseable, or when the sample date precedes
/// the onset date. The imputation median is computed over the rows that
/// survive the date checks, then every age is truncated toward zero.
pub fn clean_cases(raw: &[RawCase], date_formats: &[String]) -> (Vec<CaseRecord>, CleaningSummary) {
    let mut summary = CleaningSummary {
        rows_read: raw.len(),
        ..Default::default()
    };

    // First pass: parse dates and drop inconsistent rows.
    let mut survivors: Vec<(&RawCase, NaiveDate, NaiveDate)> = Vec::new();
    for row in raw {
        let onset = row
            .date_of_onset
            .as_deref()
            .and_then(|v| parse_date(v, date_formats));
        let sample = row
            .date_of_sample
            .as_deref()
            .and_then(|v| parse_date(v, date_formats));

        match (onset, sample) {
            (Some(onset), Some(sample)) if sample >= onset => {
                survivors.push((row, onset, sample));
            }
            (Some(_), Some(_)) => {
                summary.rows_dropped_inverted_dates += 1;
                debug!("dropping row with sample before onset: {:?}", row);
            }
            _ => {
                summary.rows_dropped_missing_dates += 1;
                debug!("dropping row with missing date: {:?}", row);
            }
        }
    }

    // Imputation median over the surviving rows' present ages.
    let present_ages: Vec<f64> = survivors.iter().filter_map(|(row, _, _)| row.age).collect();
    summary.median_age = median_age(&present_ages);

    // Second pass: impute, truncate, bucket, derive.
    let mut records = Vec::with_capacity(survivors.len());
    for (row, onset, sample) in survivors {
        let age_value = match row.age {
            Some(age) => age,
            None => {
                summary.ages_imputed += 1;
                summary.median_age.unwrap_or(0.0)
            }
        };
        let age = age_value.trunc() as u32;

        records.push(CaseRecord {
            date_of_onset: onset,
            date_of_sample: sample,
            age,
            age_group: AgeGroup::from_age(age),
            district: row.district.clone(),
            status: Status::from(row.status.as_str()),
            time_to_sample: (sample - onset).num_days(),
        });
    }

    debug!(
        "cleaned table: {} of {} rows retained ({} dropped, {} ages imputed)",
        records.len(),
        summary.rows_read,
        summary.rows_dropped(),
        summary.ages_imputed
    );

    (records, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats() -> Vec<String> {
        vec![
            "%Y-%m-%d".to_string(),
            "%m/%d/%Y".to_string(),
            "%d/%m/%Y".to_string(),
        ]
    }

    fn raw(onset: &str, sample: &str, age: Option<f64>, district: &str, status: &str) -> RawCase {
        RawCase {
            date_of_onset: (!onset.is_empty()).then(|| onset.to_string()),
            date_of_sample: (!sample.is_empty()).then(|| sample.to_string()),
            age,
            district: district.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_inverted_dates_are_dropped() {
        // Worked example: the second row samples before onset.
        let rows = vec![
            raw("2015-01-01", "2015-01-03", Some(25.0), "A", "confirmed"),
            raw("2015-01-02", "2015-01-01", Some(40.0), "B", "suspected"),
        ];

        let (records, summary) = clean_cases(&rows, &formats());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].age_group, AgeGroup::YoungAdult);
        assert_eq!(records[0].time_to_sample, 2);
        assert_eq!(summary.rows_dropped_inverted_dates, 1);
        assert_eq!(summary.rows_retained(), 1);
    }

    #[test]
    fn test_missing_or_unparseable_dates_are_dropped() {
        let rows = vec![
            raw("", "2015-01-03", Some(25.0), "A", "confirmed"),
            raw("2015-01-01", "", Some(30.0), "A", "confirmed"),
            raw("not-a-date", "2015-01-03", Some(35.0), "A", "confirmed"),
            raw("2015-01-01", "2015-01-02", Some(20.0), "A", "confirmed"),
        ];

        let (records, summary) = clean_cases(&rows, &formats());

        assert_eq!(records.len(), 1);
        assert_eq!(summary.rows_dropped_missing_dates, 3);
        assert_eq!(summary.rows_dropped_inverted_dates, 0);
    }

    #[test]
    fn test_fallback_date_formats() {
        let rows = vec![raw("01/05/2015", "01/07/2015", Some(25.0), "A", "confirmed")];

        let (records, _) = clean_cases(&rows, &formats());

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].date_of_onset,
            NaiveDate::from_ymd_opt(2015, 1, 5).unwrap()
        );
        assert_eq!(records[0].time_to_sample, 2);
    }

    #[test]
    fn test_equal_dates_are_retained() {
        let rows = vec![raw("2015-01-01", "2015-01-01", Some(25.0), "A", "confirmed")];

        let (records, _) = clean_cases(&rows, &formats());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].time_to_sample, 0);
    }

    #[test]
    fn test_median_imputation_odd_count() {
        let rows = vec![
            raw("2015-01-01", "2015-01-02", Some(10.0), "A", "confirmed"),
            raw("2015-01-01", "2015-01-02", Some(30.0), "A", "confirmed"),
            raw("2015-01-01", "2015-01-02", Some(50.0), "A", "confirmed"),
            raw("2015-01-01", "2015-01-02", None, "A", "confirmed"),
        ];

        let (records, summary) = clean_cases(&rows, &formats());

        assert_eq!(summary.median_age, Some(30.0));
        assert_eq!(summary.ages_imputed, 1);
        assert_eq!(records[3].age, 30);
        assert_eq!(records[3].age_group, AgeGroup::YoungAdult);
    }

    #[test]
    fn test_median_imputation_even_count_truncates() {
        let rows = vec![
            raw("2015-01-01", "2015-01-02", Some(20.0), "A", "confirmed"),
            raw("2015-01-01", "2015-01-02", Some(25.0), "A", "confirmed"),
            raw("2015-01-01", "2015-01-02", None, "A", "confirmed"),
        ];

        let (records, summary) = clean_cases(&rows, &formats());

        // Median of [20, 25] is 22.5; assignment truncates to 22.
        assert_eq!(summary.median_age, Some(22.5));
        assert_eq!(records[2].age, 22);
    }

    #[test]
    fn test_float_ages_truncate_without_imputation() {
        let rows = vec![raw("2015-01-01", "2015-01-02", Some(34.7), "A", "confirmed")];

        let (records, summary) = clean_cases(&rows, &formats());

        assert_eq!(records[0].age, 34);
        assert_eq!(summary.ages_imputed, 0);
    }

    #[test]
    fn test_median_uses_only_surviving_rows() {
        let rows = vec![
            raw("2015-01-01", "2015-01-02", Some(20.0), "A", "confirmed"),
            raw("2015-01-01", "2015-01-02", Some(30.0), "A", "confirmed"),
            // Dropped row; its age must not shift the median.
            raw("2015-01-05", "2015-01-01", Some(90.0), "A", "confirmed"),
            raw("2015-01-01", "2015-01-02", None, "A", "confirmed"),
        ];

        let (records, summary) = clean_cases(&rows, &formats());

        assert_eq!(summary.median_age, Some(25.0));
        assert_eq!(records[2].age, 25);
    }

    #[test]
    fn test_out_of_range_ages_get_unknown_group() {
        let rows = vec![
            raw("2015-01-01", "2015-01-02", Some(0.0), "A", "confirmed"),
            raw("2015-01-01", "2015-01-02", Some(104.0), "A", "confirmed"),
        ];

        let (records, _) = clean_cases(&rows, &formats());

        assert_eq!(records[0].age_group, AgeGroup::Unknown);
        assert_eq!(records[1].age_group, AgeGroup::Unknown);
    }

    #[test]
    fn test_all_retained_records_satisfy_date_invariant() {
        let rows = vec![
            raw("2015-01-01", "2015-01-10", Some(25.0), "A", "confirmed"),
            raw("2015-01-03", "2015-01-03", Some(40.0), "B", "suspected"),
            raw("2015-01-05", "2015-01-04", Some(50.0), "C", "confirmed"),
            raw("", "", None, "D", "suspected"),
        ];

        let (records, _) = clean_cases(&rows, &formats());

        for record in &records {
            assert!(record.date_of_sample >= record.date_of_onset);
            assert!(record.time_to_sample >= 0);
            assert_eq!(record.age_group, AgeGroup::from_age(record.age));
        }
    }

    #[test]
    fn test_empty_input_produces_empty_table() {
        let (records, summary) = clean_cases(&[], &formats());

        assert!(records.is_empty());
        assert_eq!(summary.rows_read, 0);
        assert_eq!(summary.median_age, None);
    }
}
