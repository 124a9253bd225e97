//! Summary metrics over a filtered view.

use crate::models::{CaseRecord, Metrics, Status};

/// Round to one decimal place, half away from zero.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Reduce a filtered view to the three scalar summary metrics.
///
/// An empty view is not an error: it yields zero confirmed cases, an
/// undefined average and a ratio of 0.0.
pub fn calculate_metrics(records: &[CaseRecord]) -> Metrics {
    let total_confirmed = records
        .iter()
        .filter(|r| r.status == Status::Confirmed)
        .count();

    let avg_time_to_sample = if records.is_empty() {
        None
    } else {
        let total: i64 = records.iter().map(|r| r.time_to_sample).sum();
        Some(round1(total as f64 / records.len() as f64))
    };

    let confirmed_ratio = if records.is_empty() {
        0.0
    } else {
        round1(total_confirmed as f64 / records.len() as f64 * 100.0)
    };

    Metrics {
        total_confirmed,
        avg_time_to_sample,
        confirmed_ratio,
    }
}
