//! CLI entry point for the AirGuard analytics tool.
//!
//! Provides subcommands for analyzing a local or remote data file, loading
//! a location from the backend, and converting a PM2.5 reading to AQI.

use airguard::analytics::summary::{StatisticsSummary, SummaryOptions};
use airguard::aqi::{AqiReading, MaskAdvice};
use airguard::config::LoaderConfig;
use airguard::fetch::{BasicClient, fetch_bytes};
use airguard::loader::{LoadOutcome, LocationLoader};
use airguard::normalize::{MissingPolicy, SourceProfile};
use airguard::output::{SummaryRecord, append_record, print_json, print_pretty};
use airguard::parser::{ParsedRows, parse_csv, parse_json};
use airguard::series::ingest;
use airguard::source::BackendClient;
use airguard::view::ViewModel;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "airguard")]
#[command(about = "Air-quality data normalization and analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a CSV or JSON data file from a path or URL
    Analyze {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Source profile: "csv", "api", or a path to a profile JSON file
        #[arg(short, long, default_value = "csv")]
        profile: String,

        /// How missing readings are treated: "zero" or "absent"
        #[arg(short, long)]
        missing: Option<MissingPolicy>,

        /// Hours of data expected, for the coverage figure
        #[arg(short, long, default_value_t = 24)]
        expected_hours: u32,

        /// CSV file to append a summary row to
        #[arg(short, long)]
        output: Option<String>,

        /// Log the full view model as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Load a location's history and prediction from the backend
    Location {
        /// Display name, e.g. "Mexico City"
        #[arg(value_name = "NAME")]
        name: String,

        /// CSV file to append a summary row to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Convert a PM2.5 concentration (µg/m³) to AQI
    Aqi {
        #[arg(value_name = "PM25")]
        pm25: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/airguard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("airguard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            profile,
            missing,
            expected_hours,
            output,
            json,
        } => {
            let mut profile = resolve_profile(&profile)?;
            if let Some(policy) = missing {
                profile = profile.with_missing_policy(policy);
            }

            let bytes = fetcher(&source).await?;
            let text = String::from_utf8(bytes).context("input is not UTF-8")?;
            let parsed = parse_any(&source, &text)?;

            let (series, report) = ingest(parsed, &profile);
            if series.is_empty() {
                anyhow::bail!(
                    "no valid samples in {} ({} rows skipped)",
                    source,
                    report.skipped()
                );
            }

            let options = SummaryOptions {
                expected_hours,
                ..SummaryOptions::default()
            };
            let statistics = StatisticsSummary::compute(&series, &options);
            let view = ViewModel::assemble(series, statistics, None, report);

            report_view(&source, &view, output.as_deref(), json)?;
        }
        Commands::Location { name, output } => {
            let config = LoaderConfig::from_env()?;
            let client = BasicClient::with_timeout(config.request_timeout)?;
            let backend = BackendClient::new(client, &config.api_base_url);
            let loader = LocationLoader::new(backend, config);

            match loader.load(&name).await? {
                LoadOutcome::Current(view) => {
                    report_view(&name, &view, output.as_deref(), true)?;
                }
                LoadOutcome::Superseded { location } => {
                    warn!(location, "Load was superseded");
                }
            }
        }
        Commands::Aqi { pm25 } => {
            let reading = AqiReading::from_pm25(pm25);
            let mask = MaskAdvice::for_aqi(reading.aqi);
            info!(
                pm25,
                aqi = reading.aqi,
                level = reading.level.label(),
                mask = mask.description(),
                "AQI"
            );
        }
    }

    Ok(())
}

/// Loads data from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %url))]
async fn fetcher(url: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(url) {
        let client = BasicClient::new();
        fetch_bytes(&client, url).await?
    } else {
        std::fs::read(url).with_context(|| format!("failed to read '{url}'"))?
    };
    Ok(bytes)
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn resolve_profile(name: &str) -> Result<SourceProfile> {
    match name {
        "csv" => Ok(SourceProfile::csv()),
        "api" => Ok(SourceProfile::api()),
        path => SourceProfile::load(path),
    }
}

/// Picks the JSON parser for `.json` sources or JSON-looking text.
fn parse_any(source: &str, text: &str) -> Result<ParsedRows> {
    let looks_json = source.ends_with(".json")
        || matches!(text.trim_start().chars().next(), Some('[') | Some('{'));
    let parsed = if looks_json {
        parse_json(text)?
    } else {
        parse_csv(text)?
    };
    Ok(parsed)
}

fn report_view(location: &str, view: &ViewModel, output: Option<&str>, json: bool) -> Result<()> {
    print_pretty(view);
    if json {
        print_json(view)?;
    }

    let record = SummaryRecord::from_view(location, view);
    info!(
        location,
        records = record.record_count,
        skipped = record.skipped,
        coverage_percent = record.coverage_percent,
        pm25_mean = record.pm25_mean,
        latest_aqi = ?record.latest_aqi,
        trend = ?record.trend,
        "Summary"
    );

    if let Some(path) = output {
        append_record(path, &record)?;
        info!(path, "Summary row appended");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote_requires_scheme() {
        assert!(is_remote("http://localhost:5000/api/data/la"));
        assert!(is_remote("https://example.org/cdmx.csv"));
        assert!(!is_remote("http_export.csv"));
        assert!(!is_remote("data/httpdump.json"));
    }

    #[test]
    fn test_parse_any_detects_json() {
        let rows = parse_any("export.txt", "[{\"timestamp\": \"2024-01-01T00:00:00\"}]").unwrap();
        assert_eq!(rows.rows.len(), 1);
        let rows = parse_any("export.csv", "timestamp,pm25\n2024-01-01T00:00:00,3\n").unwrap();
        assert_eq!(rows.rows.len(), 1);
    }
}
