//! Output formatting and persistence for location view models.
//!
//! Supports pretty-printing, JSON serialization, and CSV append of a flat
//! summary row.

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::aqi::AqiLevel;
use crate::sample::Variable;
use crate::view::{Trend, ViewModel};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One CSV row summarizing a load.
#[derive(Debug, Serialize)]
pub struct SummaryRecord {
    pub generated_at: DateTime<Utc>,
    pub location: String,
    pub record_count: usize,
    pub skipped: usize,
    pub coverage_percent: u64,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,

    pub pm25_mean: f64,
    pub pm25_std_dev: f64,
    pub pm25_min: Option<f64>,
    pub pm25_max: Option<f64>,
    pub pm25_median: Option<f64>,

    pub latest_aqi: Option<u32>,
    pub latest_level: Option<AqiLevel>,
    pub predicted_aqi: Option<u32>,
    pub trend: Option<Trend>,
    pub temperature_pm25_r: Option<f64>,
}

impl SummaryRecord {
    pub fn from_view(location: &str, view: &ViewModel) -> Self {
        let stats = &view.statistics;
        let pm25 = stats.get(Variable::Pm25);

        SummaryRecord {
            generated_at: Utc::now(),
            location: location.to_string(),
            record_count: stats.record_count,
            skipped: view.data_quality.skipped(),
            coverage_percent: stats.coverage_percent,
            start: stats.date_range.start,
            end: stats.date_range.end,
            pm25_mean: pm25.map_or(0.0, |s| s.mean),
            pm25_std_dev: pm25.map_or(0.0, |s| s.std_dev),
            pm25_min: pm25.and_then(|s| s.min),
            pm25_max: pm25.and_then(|s| s.max),
            pm25_median: pm25.and_then(|s| s.median),
            latest_aqi: view.current.map(|c| c.reading.aqi),
            latest_level: view.current.map(|c| c.reading.level),
            predicted_aqi: view.prediction.as_ref().map(|p| p.aqi_predicted_24h),
            trend: view.change_analysis.map(|c| c.trend),
            temperature_pm25_r: stats
                .correlation(Variable::Temperature, Variable::Pm25)
                .and_then(|c| c.value()),
        }
    }
}

/// Logs a view model using Rust's debug pretty-print format.
pub fn print_pretty(view: &ViewModel) {
    debug!("{:#?}", view);
}

/// Logs a view model as pretty-printed JSON.
pub fn print_json(view: &ViewModel) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

/// Appends a [`SummaryRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &SummaryRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::summary::{StatisticsSummary, SummaryOptions};
    use crate::normalize::SourceProfile;
    use crate::parser::parse_csv;
    use crate::series::ingest;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn view() -> ViewModel {
        let text = "timestamp,pm25,temperature_2m\n2024-01-01T00:00:00,10,15\n2024-01-01T01:00:00,20,16\n2024-01-01T02:00:00,30,18\n";
        let (series, report) = ingest(parse_csv(text).unwrap(), &SourceProfile::csv());
        let stats = StatisticsSummary::compute(&series, &SummaryOptions::default());
        ViewModel::assemble(series, stats, None, report)
    }

    #[test]
    fn test_summary_record_from_view() {
        let record = SummaryRecord::from_view("Mexico City", &view());

        assert_eq!(record.location, "Mexico City");
        assert_eq!(record.record_count, 3);
        assert_eq!(record.pm25_mean, 20.0);
        assert_eq!(record.pm25_median, Some(20.0));
        assert_eq!(record.latest_aqi, Some(88));
        assert_eq!(record.latest_level, Some(AqiLevel::Moderate));
        assert_eq!(record.predicted_aqi, None);
        assert!(record.temperature_pm25_r.unwrap() > 0.9);
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&view());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&view()).unwrap();
    }

    #[test]
    fn test_append_record_creates_file() {
        let path = temp_path("airguard_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        let record = SummaryRecord::from_view("la", &view());
        append_record(&path, &record).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("airguard_test_header.csv");
        let _ = fs::remove_file(&path);

        let record = SummaryRecord::from_view("la", &view());
        append_record(&path, &record).unwrap();
        append_record(&path, &record).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let headers = reader.headers().unwrap().clone();
        for column in ["location", "coverage_percent", "pm25_median", "latest_aqi", "trend"] {
            assert!(headers.iter().any(|h| h == column), "missing column {column}");
        }

        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        let aqi_column = headers.iter().position(|h| h == "latest_aqi").unwrap();
        assert!(rows.iter().all(|r| &r[aqi_column] == "88"));

        fs::remove_file(&path).unwrap();
    }
}
