//! CSV ingestion for the raw line list.
//!
//! The loader reads the source file as-is: dates and ages keep their
//! original encodings and nothing is filtered. All row dropping happens
//! later in the cleaner.

use serde::{Deserialize, Deserializer};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading the line list.
///
/// Any loader error is fatal at startup: the tool does not run against a
/// missing or malformed source file.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The source file could not be opened or read.
    #[error("cannot read line list at {path}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// A row did not match the expected columns.
    #[error("malformed row in line list {path}")]
    Malformed {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// One raw case row, as encoded in the source file.
///
/// Date fields stay as strings here; values that are empty or marked `NA`
/// deserialize to `None`. Ages are floats because line lists commonly
/// carry them that way.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCase {
    #[serde(deserialize_with = "optional_field")]
    pub date_of_onset: Option<String>,
    #[serde(deserialize_with = "optional_field")]
    pub date_of_sample: Option<String>,
    #[serde(deserialize_with = "optional_age")]
    pub age: Option<f64>,
    pub district: String,
    pub status: String,
}

/// Deserialize a field where empty strings and `NA` mean missing.
fn optional_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "NA"))
}

/// Deserialize an age field; anything that is not a finite non-negative
/// number counts as missing.
fn optional_age<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|age| age.is_finite() && *age >= 0.0))
}

/// Read the full line list from `path`.
///
/// The file must have a header row with at least the columns
/// `date_of_onset`, `date_of_sample`, `age`, `district` and `status`.
pub fn load_cases(path: &Path) -> Result<Vec<RawCase>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| DatasetError::Open {
            path: path.display().to_string(),
            source,
        })?;

    let mut cases = Vec::new();
    for row in reader.deserialize() {
        let case: RawCase = row.map_err(|source| DatasetError::Malformed {
            path: path.display().to_string(),
            source,
        })?;
        cases.push(case);
    }

    debug!("loaded {} raw rows from {}", cases.len(), path.display());
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn test_load_basic_rows() {
        let file = write_csv(
            "date_of_onset,date_of_sample,age,district,status\n\
             2015-01-01,2015-01-03,25,Kailahun,confirmed\n\
             2015-01-02,2015-01-04,40.0,Kenema,suspected\n",
        );

        let cases = load_cases(file.path()).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].age, Some(25.0));
        assert_eq!(cases[0].district, "Kailahun");
        assert_eq!(cases[1].age, Some(40.0));
        assert_eq!(cases[1].date_of_sample.as_deref(), Some("2015-01-04"));
    }

    #[test]
    fn test_missing_values_become_none() {
        let file = write_csv(
            "date_of_onset,date_of_sample,age,district,status\n\
             ,2015-01-03,,Kailahun,confirmed\n\
             NA,NA,NA,Kenema,suspected\n",
        );

        let cases = load_cases(file.path()).unwrap();
        assert_eq!(cases[0].date_of_onset, None);
        assert_eq!(cases[0].age, None);
        assert_eq!(cases[1].date_of_onset, None);
        assert_eq!(cases[1].date_of_sample, None);
        assert_eq!(cases[1].age, None);
    }

    #[test]
    fn test_unparseable_or_negative_age_is_missing() {
        let file = write_csv(
            "date_of_onset,date_of_sample,age,district,status\n\
             2015-01-01,2015-01-03,forty,Kailahun,confirmed\n\
             2015-01-01,2015-01-03,-3,Kailahun,confirmed\n",
        );

        let cases = load_cases(file.path()).unwrap();
        assert_eq!(cases[0].age, None);
        assert_eq!(cases[1].age, None);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = load_cases(Path::new("does/not/exist.csv"));
        assert!(matches!(result, Err(DatasetError::Open { .. })));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let file = write_csv(
            "date_of_onset,date_of_sample,age,district\n\
             2015-01-01,2015-01-03,25,Kailahun\n",
        );

        let result = load_cases(file.path());
        assert!(matches!(result, Err(DatasetError::Malformed { .. })));
    }
}
