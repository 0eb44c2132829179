//! 24-hour PM2.5 prediction as returned by the prediction service.
//!
//! The record is opaque input: it is parsed and checked but never altered.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::aqi::aqi;
use crate::sample::parse_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PredictionPayload")]
pub struct PredictionRecord {
    pub city: String,
    pub timestamp: Option<NaiveDateTime>,
    pub pm25_current: f64,
    pub aqi_current: u32,
    pub pm25_predicted_24h: f64,
    pub aqi_predicted_24h: u32,
    pub prediction_timestamp: Option<NaiveDateTime>,
}

/// A supplied AQI that differs from the canonical breakpoint formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AqiDisagreement {
    pub field: &'static str,
    pub supplied: u32,
    pub canonical: u32,
}

impl PredictionRecord {
    /// Fields whose supplied AQI does not match `aqi(pm25)`.
    pub fn aqi_disagreements(&self) -> Vec<AqiDisagreement> {
        [
            ("aqi_current", self.aqi_current, self.pm25_current),
            ("aqi_predicted_24h", self.aqi_predicted_24h, self.pm25_predicted_24h),
        ]
        .into_iter()
        .filter_map(|(field, supplied, pm25)| {
            let canonical = aqi(pm25);
            (supplied != canonical).then_some(AqiDisagreement {
                field,
                supplied,
                canonical,
            })
        })
        .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionPayload {
    Flat(FlatPrediction),
    Nested(NestedPrediction),
}

#[derive(Deserialize)]
struct FlatPrediction {
    #[serde(default)]
    city: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    timestamp: Option<NaiveDateTime>,
    pm25_current: f64,
    aqi_current: u32,
    pm25_predicted_24h: f64,
    aqi_predicted_24h: u32,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    prediction_timestamp: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
struct NestedPrediction {
    #[serde(default)]
    city: String,
    current: PredictionPoint,
    prediction: PredictionPoint,
}

#[derive(Deserialize)]
struct PredictionPoint {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    timestamp: Option<NaiveDateTime>,
    pm25: f64,
    aqi: u32,
}

impl From<PredictionPayload> for PredictionRecord {
    fn from(payload: PredictionPayload) -> Self {
        match payload {
            PredictionPayload::Flat(p) => PredictionRecord {
                city: p.city,
                timestamp: p.timestamp,
                pm25_current: p.pm25_current,
                aqi_current: p.aqi_current,
                pm25_predicted_24h: p.pm25_predicted_24h,
                aqi_predicted_24h: p.aqi_predicted_24h,
                prediction_timestamp: p.prediction_timestamp,
            },
            PredictionPayload::Nested(p) => PredictionRecord {
                city: p.city,
                timestamp: p.current.timestamp,
                pm25_current: p.current.pm25,
                aqi_current: p.current.aqi,
                pm25_predicted_24h: p.prediction.pm25,
                aqi_predicted_24h: p.prediction.aqi,
                prediction_timestamp: p.prediction.timestamp,
            },
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
