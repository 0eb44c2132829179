use chrono::NaiveDateTime;
use serde::Serialize;

use crate::series::SampleSeries;

/// Loaded samples as a percentage of the hours expected.
///
/// Not capped: more history than `expected_hours` yields more than 100.
/// Returns 0 when `expected_hours` is 0.
pub fn coverage_percent(sample_count: usize, expected_hours: u32) -> u64 {
    if expected_hours == 0 {
        return 0;
    }
    (sample_count as f64 / expected_hours as f64 * 100.0).round() as u64
}

/// Earliest and latest timestamps; both `None` for an empty series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    /// Length of the range in whole hours, if it is non-empty.
    pub fn span_hours(&self) -> Option<i64> {
        Some((self.end? - self.start?).num_hours())
    }
}

pub fn date_range(series: &SampleSeries) -> DateRange {
    DateRange {
        start: series.timestamps().min(),
        end: series.timestamps().max(),
    }
}
