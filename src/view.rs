//! Read-only shapes handed to the presentation layer.

use serde::Serialize;

use crate::analytics::summary::StatisticsSummary;
use crate::aqi::{AqiLevel, AqiReading, MaskAdvice};
use crate::prediction::PredictionRecord;
use crate::sample::Sample;
use crate::series::{IngestReport, SampleSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Worsening,
}

/// Current versus predicted comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChangeAnalysis {
    pub pm25_delta: f64,
    pub aqi_delta: i64,
    /// `|pm25_delta / pm25_current| * 100`, or 0 when current PM2.5 is 0.
    pub percent_change: f64,
    pub trend: Trend,
    pub current_level: AqiLevel,
    pub predicted_level: AqiLevel,
}

impl ChangeAnalysis {
    pub fn from_prediction(p: &PredictionRecord) -> Self {
        let pm25_delta = p.pm25_predicted_24h - p.pm25_current;
        let aqi_delta = i64::from(p.aqi_predicted_24h) - i64::from(p.aqi_current);
        let percent_change = if p.pm25_current > 0.0 {
            (pm25_delta / p.pm25_current * 100.0).abs()
        } else {
            0.0
        };

        ChangeAnalysis {
            pm25_delta,
            aqi_delta,
            percent_change,
            trend: if aqi_delta < 0 {
                Trend::Improving
            } else {
                Trend::Worsening
            },
            current_level: AqiLevel::from_aqi(p.aqi_current),
            predicted_level: AqiLevel::from_aqi(p.aqi_predicted_24h),
        }
    }
}

/// Conditions at the latest sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub reading: AqiReading,
    pub mask: MaskAdvice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub latest_sample: Option<Sample>,
    pub current: Option<CurrentConditions>,
    pub series: SampleSeries,
    pub statistics: StatisticsSummary,
    pub prediction: Option<PredictionRecord>,
    pub change_analysis: Option<ChangeAnalysis>,
    pub data_quality: IngestReport,
}

impl ViewModel {
    /// Combines a loaded series with its statistics and an optional prediction.
    ///
    /// Performs no I/O. A missing prediction leaves `change_analysis` empty.
    pub fn assemble(
        series: SampleSeries,
        statistics: StatisticsSummary,
        prediction: Option<PredictionRecord>,
        data_quality: IngestReport,
    ) -> Self {
        let latest_sample = series.latest().cloned();
        let current = latest_sample.as_ref().and_then(|s| s.pm25).map(|pm25| {
            let reading = AqiReading::from_pm25(pm25);
            CurrentConditions {
                reading,
                mask: MaskAdvice::for_aqi(reading.aqi),
            }
        });
        let change_analysis = prediction.as_ref().map(ChangeAnalysis::from_prediction);

        ViewModel {
            latest_sample,
            current,
            series,
            statistics,
            prediction,
            change_analysis,
            data_quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::summary::SummaryOptions;
    use crate::normalize::SourceProfile;
    use crate::parser::parse_csv;
    use crate::series::ingest;

    fn prediction(pm_now: f64, aqi_now: u32, pm_next: f64, aqi_next: u32) -> PredictionRecord {
        PredictionRecord {
            city: "LA".to_string(),
            timestamp: None,
            pm25_current: pm_now,
            aqi_current: aqi_now,
            pm25_predicted_24h: pm_next,
            aqi_predicted_24h: aqi_next,
            prediction_timestamp: None,
        }
    }

    fn build(prediction: Option<PredictionRecord>) -> ViewModel {
        let text = "timestamp,pm25\n2024-01-01T00:00:00,10\n2024-01-01T01:00:00,20\n";
        let (series, report) = ingest(parse_csv(text).unwrap(), &SourceProfile::csv());
        let stats = StatisticsSummary::compute(&series, &SummaryOptions::default());
        ViewModel::assemble(series, stats, prediction, report)
    }

    #[test]
    fn test_change_analysis_improving() {
        let change = ChangeAnalysis::from_prediction(&prediction(20.0, 67, 10.0, 42));
        assert_eq!(change.pm25_delta, -10.0);
        assert_eq!(change.aqi_delta, -25);
        assert_eq!(change.percent_change, 50.0);
        assert_eq!(change.trend, Trend::Improving);
        assert_eq!(change.current_level, AqiLevel::Moderate);
        assert_eq!(change.predicted_level, AqiLevel::Good);
    }

    #[test]
    fn test_change_analysis_flat_aqi_is_worsening() {
        let change = ChangeAnalysis::from_prediction(&prediction(20.0, 67, 20.2, 67));
        assert_eq!(change.aqi_delta, 0);
        assert_eq!(change.trend, Trend::Worsening);
    }

    #[test]
    fn test_change_analysis_zero_current() {
        let change = ChangeAnalysis::from_prediction(&prediction(0.0, 0, 5.0, 21));
        assert_eq!(change.percent_change, 0.0);
        assert_eq!(change.trend, Trend::Worsening);
    }

    #[test]
    fn test_assemble_without_prediction() {
        let view = build(None);

        assert!(view.prediction.is_none());
        assert!(view.change_analysis.is_none());
        assert_eq!(view.latest_sample.as_ref().and_then(|s| s.pm25), Some(20.0));
        let current = view.current.unwrap();
        assert_eq!(current.reading.aqi, 67);
        assert_eq!(current.mask, MaskAdvice::N95);
        assert_eq!(view.series.len(), 2);
    }

    #[test]
    fn test_assemble_with_prediction() {
        let view = build(Some(prediction(20.0, 67, 40.0, 111)));
        let change = view.change_analysis.unwrap();
        assert_eq!(change.trend, Trend::Worsening);
        assert_eq!(change.aqi_delta, 44);
        assert_eq!(change.percent_change, 100.0);
    }

    #[test]
    fn test_assemble_empty_series() {
        let view = ViewModel::assemble(
            SampleSeries::default(),
            StatisticsSummary::compute(&SampleSeries::default(), &SummaryOptions::default()),
            None,
            IngestReport::default(),
        );
        assert!(view.latest_sample.is_none());
        assert!(view.current.is_none());
    }

    #[test]
    fn test_view_serializes() {
        let json = serde_json::to_value(build(Some(prediction(20.0, 67, 10.0, 42)))).unwrap();
        assert_eq!(json["change_analysis"]["trend"], "improving");
        assert_eq!(json["current"]["reading"]["level"], "moderate");
        assert_eq!(json["series"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["statistics"]["variables"]["pm25"]["mean"], 15.0);
    }
}
