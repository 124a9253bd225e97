//! EpiView - Outbreak Line-List Analytics
//!
//! A CLI tool that loads an outbreak line list (CSV), cleans it, and
//! reports case trends, district breakdowns, age-group histograms and
//! summary metrics under user-selected filters.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing/malformed data file, config, I/O)
//!   2 - Empty filtered view with --fail-on-empty set

mod analysis;
mod cli;
mod config;
mod dataset;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{CaseFilter, CaseRecord, CleaningSummary, Report, ReportMetadata};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("EpiView v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the analysis
    match run_analysis(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .epiview.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".epiview.toml");

    if path.exists() {
        eprintln!("⚠️  .epiview.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .epiview.toml")?;

    println!("✅ Created .epiview.toml with default settings.");
    println!("   Edit it to customize the data path, date formats, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete analysis workflow. Returns exit code (0 or 2).
fn run_analysis(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let data_path = std::path::PathBuf::from(&config.dataset.path);

    // Step 1: Load and clean the line list
    println!("📥 Loading line list: {}", data_path.display());

    let spinner = make_spinner(&args, "Loading and cleaning line list...");
    let raw = dataset::load_cases(&data_path)?;
    let (cases, summary) = dataset::clean_cases(&raw, &config.dataset.date_formats);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    println!(
        "🧹 Cleaned: {} of {} rows retained ({} dropped, {} ages imputed)",
        summary.rows_retained(),
        summary.rows_read,
        summary.rows_dropped(),
        summary.ages_imputed
    );

    if cases.is_empty() {
        warn!("Cleaned table is empty; every row was dropped during cleaning");
    }

    // Handle --dry-run: print the dataset summary and exit
    if args.dry_run {
        return handle_dry_run(&cases, &summary);
    }

    // Step 2: Build the filter state
    let mut district_filter = CaseFilter::all();
    if let Some(ref districts) = args.districts {
        district_filter = district_filter.with_districts(districts.iter().cloned());
    }

    // The age-group selection scopes only the confirmed-cases histogram.
    let mut histogram_filter = district_filter.clone();
    if let Some(groups) = args.age_group_selection() {
        histogram_filter = histogram_filter.with_age_groups(groups);
    }

    // Step 3: Derive the filtered views and metrics
    println!("📊 Computing views and metrics...");

    let view = district_filter.apply(&cases);
    let histogram_view = histogram_filter.apply(&cases);

    let metrics = analysis::calculate_metrics(&view);
    let daily = analysis::daily_status_counts(&view);
    let cumulative = analysis::cumulative_status_counts(&view);
    let districts = analysis::district_status_counts(&view);
    let age_histogram = analysis::age_group_histogram(&histogram_view);
    let status_distribution = analysis::status_distribution(&view);

    info!(
        "view: {} cases, {} confirmed",
        view.len(),
        metrics.total_confirmed
    );

    // Step 4: Build the report
    println!("📝 Generating report...");

    let duration = start_time.elapsed().as_secs_f64();
    let metadata = ReportMetadata {
        source: config.dataset.path.clone(),
        generated_at: Utc::now(),
        rows_read: summary.rows_read,
        rows_retained: summary.rows_retained(),
        rows_dropped: summary.rows_dropped(),
        ages_imputed: summary.ages_imputed,
        median_age: summary.median_age,
        districts_selected: args.districts.clone(),
        age_groups_selected: args.age_group_selection(),
        duration_seconds: duration,
    };

    let report = Report {
        metadata,
        metrics: metrics.clone(),
        daily,
        cumulative,
        districts,
        age_histogram,
        status_distribution,
    };

    // Step 5: Generate and save the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    std::fs::write(&config.general.output, &output)
        .with_context(|| format!("Failed to write report to {}", config.general.output))?;

    // Print summary
    println!("\n📊 Analysis Summary:");
    println!("   Cases in view: {}", view.len());
    println!(
        "   - ✅ Confirmed: {} | ⏳ Avg time to sample: {} | 📈 Confirmed ratio: {}%",
        metrics.total_confirmed,
        metrics
            .avg_time_to_sample
            .map(|avg| format!("{:.1} days", avg))
            .unwrap_or_else(|| "n/a".to_string()),
        metrics.confirmed_ratio
    );
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        config.general.output
    );

    // Check --fail-on-empty
    if args.fail_on_empty && view.is_empty() {
        eprintln!("\n⛔ No cases match the current selection. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: print the cleaned dataset summary, write nothing.
fn handle_dry_run(cases: &[CaseRecord], summary: &CleaningSummary) -> Result<i32> {
    println!("\n🔍 Dry run: dataset summary (no report written)\n");

    println!("   Rows read:     {}", summary.rows_read);
    println!(
        "   Rows dropped:  {} ({} missing dates, {} sample before onset)",
        summary.rows_dropped(),
        summary.rows_dropped_missing_dates,
        summary.rows_dropped_inverted_dates
    );
    println!("   Rows retained: {}", summary.rows_retained());
    if let Some(median) = summary.median_age {
        println!(
            "   Ages imputed:  {} (median {:.1})",
            summary.ages_imputed, median
        );
    }

    let mut districts: BTreeMap<&str, usize> = BTreeMap::new();
    for case in cases {
        *districts.entry(case.district.as_str()).or_default() += 1;
    }

    if districts.is_empty() {
        println!("\n   No districts present in the cleaned table.");
    } else {
        println!("\n   Districts present:\n");
        for (district, count) in &districts {
            println!("     📍 {} ({} cases)", district, count);
        }
    }

    println!("\n✅ Dry run complete. No report was written.");
    Ok(0)
}

/// Create a progress spinner unless running quiet.
fn make_spinner(args: &Args, message: &'static str) -> Option<ProgressBar> {
    if args.quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner());
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .epiview.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
