//! Chronological sample history for one location, and the ingestion step
//! that builds it from parsed rows.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::normalize::SourceProfile;
use crate::parser::ParsedRows;
use crate::sample::{Sample, Variable};

/// Samples in ascending timestamp order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampleSeries(Vec<Sample>);

impl SampleSeries {
    /// Builds a series, stably sorting by timestamp.
    pub fn new(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        SampleSeries(samples)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.0.last()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.0.first()
    }

    /// The trailing `count` samples, or all of them if fewer exist.
    pub fn recent(&self, count: usize) -> &[Sample] {
        &self.0[self.0.len().saturating_sub(count)..]
    }

    /// Present values of `variable`, in order.
    pub fn values(&self, variable: Variable) -> Vec<f64> {
        self.0.iter().filter_map(|s| s.get(variable)).collect()
    }

    /// `(a, b)` pairs from samples where both variables are present.
    pub fn paired_values(&self, a: Variable, b: Variable) -> (Vec<f64>, Vec<f64>) {
        self.0
            .iter()
            .filter_map(|s| Some((s.get(a)?, s.get(b)?)))
            .unzip()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.0.iter().map(|s| s.timestamp)
    }
}

/// Counts of what ingestion had to drop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Rows rejected by the parser for shape problems.
    pub malformed_rows: usize,
    /// Rows the normalizer could not turn into a sample.
    pub malformed_samples: usize,
}

impl IngestReport {
    pub fn skipped(&self) -> usize {
        self.malformed_rows + self.malformed_samples
    }
}

/// Normalizes every parsed row with `profile`, skipping the ones that fail.
pub fn ingest(parsed: ParsedRows, profile: &SourceProfile) -> (SampleSeries, IngestReport) {
    let mut report = IngestReport {
        malformed_rows: parsed.rejected.len(),
        malformed_samples: 0,
    };

    let mut samples = Vec::with_capacity(parsed.rows.len());
    for (index, row) in parsed.rows.iter().enumerate() {
        match profile.normalize(row) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                warn!(profile = %profile.name, index, error = %e, "Skipping malformed sample");
                report.malformed_samples += 1;
            }
        }
    }

    let series = SampleSeries::new(samples);
    debug!(
        profile = %profile.name,
        samples = series.len(),
        skipped = report.skipped(),
        "Ingestion complete"
    );
    (series, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::MissingPolicy;
    use crate::parser::parse_csv;

    #[test]
    fn test_ingest_skips_missing_timestamp() {
        let text = "timestamp,pm25\n2024-01-01T00:00:00,10\n,20\n2024-01-01T02:00:00,30\n";
        let parsed = parse_csv(text).unwrap();
        let (series, report) = ingest(parsed, &SourceProfile::csv());

        assert_eq!(series.len(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.malformed_samples, 1);
        assert_eq!(report.malformed_rows, 0);
    }

    #[test]
    fn test_ingest_counts_rejected_rows() {
        let text = "timestamp,pm25\n2024-01-01T00:00:00,10\n2024-01-01T01:00:00\n";
        let parsed = parse_csv(text).unwrap();
        let (series, report) = ingest(parsed, &SourceProfile::csv());

        assert_eq!(series.len(), 1);
        assert_eq!(report.malformed_rows, 1);
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn test_series_is_chronological() {
        let text = "timestamp,pm25\n2024-01-01T02:00:00,30\n2024-01-01T00:00:00,10\n2024-01-01T01:00:00,20\n";
        let (series, _) = ingest(parse_csv(text).unwrap(), &SourceProfile::csv());

        assert_eq!(series.values(Variable::Pm25), vec![10.0, 20.0, 30.0]);
        assert_eq!(series.latest().and_then(|s| s.pm25), Some(30.0));
        assert_eq!(series.first().and_then(|s| s.pm25), Some(10.0));
    }

    #[test]
    fn test_recent_window() {
        let text = "timestamp,pm25\n2024-01-01T00:00:00,1\n2024-01-01T01:00:00,2\n2024-01-01T02:00:00,3\n";
        let (series, _) = ingest(parse_csv(text).unwrap(), &SourceProfile::csv());

        assert_eq!(series.recent(2).len(), 2);
        assert_eq!(series.recent(2)[0].pm25, Some(2.0));
        assert_eq!(series.recent(10).len(), 3);
        assert!(series.recent(0).is_empty());
    }

    #[test]
    fn test_paired_values_skip_absent() {
        let text = "timestamp,pm25,temperature_2m\n2024-01-01T00:00:00,10,20\n2024-01-01T01:00:00,,21\n2024-01-01T02:00:00,12,22\n";
        let profile = SourceProfile::csv().with_missing_policy(MissingPolicy::Absent);
        let (series, _) = ingest(parse_csv(text).unwrap(), &profile);

        let (temps, pm) = series.paired_values(Variable::Temperature, Variable::Pm25);
        assert_eq!(temps, vec![20.0, 22.0]);
        assert_eq!(pm, vec![10.0, 12.0]);
        assert_eq!(series.values(Variable::Temperature).len(), 3);
    }
}
