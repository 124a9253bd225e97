//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::AgeGroup;
use clap::Parser;
use std::path::PathBuf;

/// EpiView - line-list analytics and reporting for outbreak case data
///
/// Load an outbreak line list (CSV), clean it, and report case trends,
/// district breakdowns, age-group histograms and summary metrics under
/// user-selected filters. Markdown/JSON reports. Built in Rust.
///
/// Examples:
///   epiview
///   epiview --data assets/ebola_sierra_leone.csv --format json
///   epiview --districts Kailahun,Kenema --output kailahun.md
///   epiview --age-groups 19-35,36-60 --dry-run
///   epiview --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the line-list CSV file
    ///
    /// The file must have a header row with the columns date_of_onset,
    /// date_of_sample, age, district and status. Defaults to the path in
    /// .epiview.toml (assets/ebola_sierra_leone.csv out of the box).
    #[arg(short, long, value_name = "FILE", env = "EPIVIEW_DATA")]
    pub data: Option<PathBuf>,

    /// Districts to include (comma-separated)
    ///
    /// Example: --districts Kailahun,Kenema. Omitted means all districts.
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub districts: Option<Vec<String>>,

    /// Age groups to include in the confirmed-cases histogram (comma-separated)
    ///
    /// Values: 0-18, 19-35, 36-60, 61+, unknown. Omitted means all groups.
    /// Only the histogram view is scoped by this selection.
    #[arg(long, value_name = "GROUPS", value_delimiter = ',')]
    pub age_groups: Option<Vec<String>>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .epiview.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: load and clean the dataset, print a summary, write no report
    #[arg(long)]
    pub dry_run: bool,

    /// Fail if the district selection matches no cases
    ///
    /// Useful for scripted runs. Exit code 2 when the filtered view is empty.
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Generate a default .epiview.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate age group labels
        if let Some(ref groups) = self.age_groups {
            for group in groups {
                group.parse::<AgeGroup>()?;
            }
        }

        // Validate the data file if explicitly provided
        if let Some(ref data) = self.data {
            if !data.exists() {
                return Err(format!("Data file does not exist: {}", data.display()));
            }
            if !data.is_file() {
                return Err(format!("Data path is not a file: {}", data.display()));
            }
        }

        Ok(())
    }

    /// The parsed age-group selection, if one was given.
    ///
    /// Call after [`Args::validate`]; unknown labels are skipped here.
    pub fn age_group_selection(&self) -> Option<Vec<AgeGroup>> {
        self.age_groups.as_ref().map(|groups| {
            groups
                .iter()
                .filter_map(|g| g.parse::<AgeGroup>().ok())
                .collect()
        })
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
