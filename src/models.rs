//! Data models for the line-list analytics pipeline.
//!
//! This module contains the core data structures used throughout the
//! application: cleaned case records, filter state, aggregate view rows,
//! and summary metrics.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Case classification of a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    /// Laboratory-confirmed case.
    Confirmed,
    /// Suspected case awaiting confirmation.
    Suspected,
    /// Any other classification found in the source data.
    Other(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Confirmed => write!(f, "confirmed"),
            Status::Suspected => write!(f, "suspected"),
            Status::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "confirmed" => Status::Confirmed,
            "suspected" => Status::Suspected,
            other => Status::Other(other.to_string()),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Status::from(s.as_str()))
    }
}

/// Coarse age bucket used for aggregate reporting.
///
/// Buckets follow the half-open bins (0,18], (18,35], (35,60], (60,100].
/// Ages outside (0,100] fall into [`AgeGroup::Unknown`] rather than being
/// clamped or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeGroup {
    /// Ages 1 through 18.
    Child,
    /// Ages 19 through 35.
    YoungAdult,
    /// Ages 36 through 60.
    Adult,
    /// Ages 61 through 100.
    Senior,
    /// Age outside the bucketed range.
    Unknown,
}

impl AgeGroup {
    /// All groups, in reporting order.
    #[allow(dead_code)] // Utility for building filter selections
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Child,
        AgeGroup::YoungAdult,
        AgeGroup::Adult,
        AgeGroup::Senior,
        AgeGroup::Unknown,
    ];

    /// Bucket an age (in whole years) into its group.
    pub fn from_age(age: u32) -> Self {
        match age {
            1..=18 => AgeGroup::Child,
            19..=35 => AgeGroup::YoungAdult,
            36..=60 => AgeGroup::Adult,
            61..=100 => AgeGroup::Senior,
            _ => AgeGroup::Unknown,
        }
    }

    /// The label used in reports and filter selections.
    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Child => "0-18",
            AgeGroup::YoungAdult => "19-35",
            AgeGroup::Adult => "36-60",
            AgeGroup::Senior => "61+",
            AgeGroup::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for AgeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0-18" => Ok(AgeGroup::Child),
            "19-35" => Ok(AgeGroup::YoungAdult),
            "36-60" => Ok(AgeGroup::Adult),
            "61+" => Ok(AgeGroup::Senior),
            "unknown" => Ok(AgeGroup::Unknown),
            other => Err(format!(
                "unknown age group '{}' (expected 0-18, 19-35, 36-60, 61+ or unknown)",
                other
            )),
        }
    }
}

impl Serialize for AgeGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for AgeGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AgeGroup::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A cleaned case record.
///
/// Records are built once by the cleaner and never mutated afterwards.
/// Every record satisfies `date_of_sample >= date_of_onset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Date symptoms began.
    pub date_of_onset: NaiveDate,
    /// Date a diagnostic sample was taken.
    pub date_of_sample: NaiveDate,
    /// Age in whole years (imputed when missing in the source).
    pub age: u32,
    /// Age bucket derived from `age`.
    pub age_group: AgeGroup,
    /// District the case was reported in.
    pub district: String,
    /// Case classification.
    pub status: Status,
    /// Days between onset and sample; never negative.
    pub time_to_sample: i64,
}

/// User-controlled view selection.
///
/// `None` for either field means "no restriction". The two selections are
/// combined by logical AND in [`CaseFilter::matches`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseFilter {
    /// Districts to include; `None` selects all districts.
    pub districts: Option<BTreeSet<String>>,
    /// Age groups to include; `None` selects all groups.
    pub age_groups: Option<BTreeSet<AgeGroup>>,
}

impl CaseFilter {
    /// A filter that selects every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to the given districts.
    pub fn with_districts<I, S>(mut self, districts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.districts = Some(districts.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to the given age groups.
    pub fn with_age_groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = AgeGroup>,
    {
        self.age_groups = Some(groups.into_iter().collect());
        self
    }

    /// Whether a record passes both selections.
    pub fn matches(&self, record: &CaseRecord) -> bool {
        if let Some(ref districts) = self.districts {
            if !districts.contains(&record.district) {
                return false;
            }
        }

        if let Some(ref groups) = self.age_groups {
            if !groups.contains(&record.age_group) {
                return false;
            }
        }

        true
    }

    /// Select the matching subset of a cleaned table.
    ///
    /// Always derives a fresh view; the input table is never mutated.
    pub fn apply(&self, records: &[CaseRecord]) -> Vec<CaseRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

/// One row of the daily-by-status view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    /// Onset date the cases are grouped under.
    pub date: NaiveDate,
    pub status: Status,
    pub cases: usize,
}

/// One row of the cumulative-by-status view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeCount {
    pub date: NaiveDate,
    pub status: Status,
    /// Cases with this onset date and status.
    pub cases: usize,
    /// Running total for this status up to and including `date`.
    pub cumulative_cases: usize,
}

/// One row of the district-by-status view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictCount {
    pub district: String,
    pub status: Status,
    pub cases: usize,
}

/// One bar of the confirmed-cases-by-age-group histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeGroupCount {
    pub age_group: AgeGroup,
    pub cases: usize,
}

/// One slice of the status distribution view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub cases: usize,
}

/// The three scalar summary metrics shown for a filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Number of confirmed cases in the view.
    pub total_confirmed: usize,
    /// Mean days from onset to sample, rounded to one decimal.
    /// `None` when the view is empty.
    pub avg_time_to_sample: Option<f64>,
    /// Percentage of confirmed cases among all cases in the view,
    /// rounded to one decimal; 0.0 when the view is empty.
    pub confirmed_ratio: f64,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the analyzed line list.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: chrono::DateTime<chrono::Utc>,
    /// Rows read from the source file.
    pub rows_read: usize,
    /// Rows retained after cleaning.
    pub rows_retained: usize,
    /// Rows dropped during cleaning.
    pub rows_dropped: usize,
    /// Ages imputed with the median.
    pub ages_imputed: usize,
    /// Median age used for imputation.
    pub median_age: Option<f64>,
    /// District selection, `None` for all districts.
    pub districts_selected: Option<Vec<String>>,
    /// Age-group selection, `None` for all groups.
    pub age_groups_selected: Option<Vec<AgeGroup>>,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete analytics report: metadata, metrics and every view.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// Summary metrics for the filtered view.
    pub metrics: Metrics,
    /// Daily cases by status.
    pub daily: Vec<DailyCount>,
    /// Cumulative cases by status.
    pub cumulative: Vec<CumulativeCount>,
    /// Cases by district and status.
    pub districts: Vec<DistrictCount>,
    /// Confirmed cases by age group.
    pub age_histogram: Vec<AgeGroupCount>,
    /// Cases by status.
    pub status_distribution: Vec<StatusCount>,
}

/// Bookkeeping produced by the cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningSummary {
    /// Rows read from the source file.
    pub rows_read: usize,
    /// Rows dropped because onset or sample date was missing/unparseable.
    pub rows_dropped_missing_dates: usize,
    /// Rows dropped because the sample date preceded the onset date.
    pub rows_dropped_inverted_dates: usize,
    /// Rows whose missing age was replaced by the median.
    pub ages_imputed: usize,
    /// Median age used for imputation, if any ages were present.
    pub median_age: Option<f64>,
}

impl CleaningSummary {
    /// Total rows removed during cleaning.
    pub fn rows_dropped(&self) -> usize {
        self.rows_dropped_missing_dates + self.rows_dropped_inverted_dates
    }

    /// Rows remaining in the cleaned table.
    pub fn rows_retained(&self) -> usize {
        self.rows_read - self.rows_dropped()
    }
}
