//! Source profiles and the row-to-[`Sample`] normalizer.
//!
//! A [`SourceProfile`] captures one upstream's field names and unit scales.
//! Two are built in: [`SourceProfile::csv`] for the exported sensor files,
//! which report gases in mg/m³, and [`SourceProfile::api`] for the backend's
//! JSON, which is already in µg/m³.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MalformedSample;
use crate::parser::{RawRow, RawValue};
use crate::sample::{Sample, SpeedUnit, Variable, parse_timestamp, timestamp_from_epoch};

/// What a missing numeric field turns into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Missing readings count as zero concentration.
    #[default]
    Zero,
    /// Missing readings stay `None` and drop out of aggregates.
    Absent,
}

impl FromStr for MissingPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(MissingPolicy::Zero),
            "absent" => Ok(MissingPolicy::Absent),
            other => Err(anyhow::anyhow!(
                "unknown missing-value policy '{other}' (expected 'zero' or 'absent')"
            )),
        }
    }
}

/// Source keys for one field, tried in order. Deserializes from a single
/// string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct FieldKeys(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for FieldKeys {
    fn from(keys: OneOrMany) -> Self {
        match keys {
            OneOrMany::One(key) => FieldKeys(vec![key]),
            OneOrMany::Many(keys) => FieldKeys(keys),
        }
    }
}

impl FieldKeys {
    /// The value under the first key that is present and non-empty.
    pub fn lookup<'a>(&self, row: &'a RawRow) -> Option<&'a RawValue> {
        self.0
            .iter()
            .filter_map(|key| row.get(key))
            .find(|value| !value.is_empty())
    }
}

impl<S: Into<String>> FromIterator<S> for FieldKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FieldKeys(iter.into_iter().map(Into::into).collect())
    }
}

/// Field-name and unit conventions of one upstream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProfile {
    pub name: String,
    pub timestamp_key: String,
    pub field_aliases: HashMap<Variable, FieldKeys>,
    #[serde(default)]
    pub scale_factors: HashMap<Variable, f64>,
    #[serde(default)]
    pub wind_speed_unit: SpeedUnit,
    #[serde(default)]
    pub missing_policy: MissingPolicy,
}

const CSV_ALIASES: &[(Variable, &[&str])] = &[
    (Variable::Pm25, &["pm25"]),
    (Variable::O3, &["o3"]),
    (Variable::So2, &["so2"]),
    (Variable::No2, &["no2"]),
    (Variable::Co, &["co"]),
    (Variable::No, &["no"]),
    (Variable::Nox, &["nox"]),
    (Variable::Temperature, &["temperature_2m"]),
    (Variable::Humidity, &["relativehumidity_2m"]),
    (Variable::PressureMsl, &["pressure_msl"]),
    (Variable::WindSpeed, &["windspeed_10m"]),
    (Variable::WindDirection, &["winddirection_10m"]),
    (Variable::Precipitation, &["precipitation"]),
    (Variable::BoundaryLayerHeight, &["boundary_layer_height"]),
    (Variable::ShortwaveRadiation, &["shortwave_radiation_sum"]),
];

/// The backend's history endpoints use either the sensor-file names or the
/// short names of the `{city, data, total_records}` payload.
const API_ALIASES: &[(Variable, &[&str])] = &[
    (Variable::Pm25, &["pm25"]),
    (Variable::O3, &["o3"]),
    (Variable::So2, &["so2"]),
    (Variable::No2, &["no2"]),
    (Variable::Co, &["co"]),
    (Variable::No, &["no"]),
    (Variable::Nox, &["nox"]),
    (Variable::Temperature, &["temperature_2m", "temperature"]),
    (Variable::Humidity, &["relativehumidity_2m", "humidity"]),
    (Variable::PressureMsl, &["pressure_msl", "pressure"]),
    (Variable::WindSpeed, &["windspeed_10m", "wind_speed"]),
    (Variable::WindDirection, &["winddirection_10m", "wind_direction"]),
    (Variable::Precipitation, &["precipitation"]),
    (Variable::BoundaryLayerHeight, &["boundary_layer_height"]),
    (Variable::ShortwaveRadiation, &["shortwave_radiation"]),
];

fn aliases(table: &[(Variable, &[&str])]) -> HashMap<Variable, FieldKeys> {
    table
        .iter()
        .map(|(v, keys)| (*v, keys.iter().copied().collect()))
        .collect()
}

/// Gas columns in the exported files are mg/m³.
const MG_TO_UG: f64 = 1000.0;

impl SourceProfile {
    /// Profile for the exported sensor/weather CSV files.
    pub fn csv() -> Self {
        let field_aliases = aliases(CSV_ALIASES);
        let scale_factors = [
            Variable::O3,
            Variable::So2,
            Variable::No2,
            Variable::Co,
            Variable::No,
            Variable::Nox,
        ]
        .into_iter()
        .map(|v| (v, MG_TO_UG))
        .collect();

        SourceProfile {
            name: "csv".to_string(),
            timestamp_key: "timestamp".to_string(),
            field_aliases,
            scale_factors,
            wind_speed_unit: SpeedUnit::KilometersPerHour,
            missing_policy: MissingPolicy::Zero,
        }
    }

    /// Profile for the backend's historical-data JSON.
    pub fn api() -> Self {
        SourceProfile {
            name: "api".to_string(),
            timestamp_key: "timestamp".to_string(),
            field_aliases: aliases(API_ALIASES),
            scale_factors: HashMap::new(),
            wind_speed_unit: SpeedUnit::KilometersPerHour,
            missing_policy: MissingPolicy::Zero,
        }
    }

    /// Loads a profile from a JSON file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source profile '{path}'"))?;
        let profile = serde_json::from_str(&content)
            .with_context(|| format!("invalid source profile '{path}'"))?;
        Ok(profile)
    }

    pub fn with_missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    pub fn scale(&self, variable: Variable) -> f64 {
        self.scale_factors.get(&variable).copied().unwrap_or(1.0)
    }

    /// Normalizes one raw row into a [`Sample`].
    ///
    /// Only the timestamp can fail. Every other field falls back according to
    /// [`SourceProfile::missing_policy`]; values that are out of range are
    /// treated as missing.
    pub fn normalize(&self, row: &RawRow) -> Result<Sample, MalformedSample> {
        let timestamp = match row.get(&self.timestamp_key) {
            None | Some(RawValue::Empty) => {
                return Err(MalformedSample::MissingTimestamp {
                    key: self.timestamp_key.clone(),
                });
            }
            Some(RawValue::Text(s)) => {
                parse_timestamp(s).ok_or_else(|| MalformedSample::UnparsableTimestamp {
                    value: s.clone(),
                })?
            }
            Some(RawValue::Number(n)) => {
                timestamp_from_epoch(*n).ok_or_else(|| MalformedSample::UnparsableTimestamp {
                    value: n.to_string(),
                })?
            }
        };

        let mut sample = Sample::at(timestamp);
        sample.wind_speed_unit = self.wind_speed_unit;

        for variable in Variable::ALL {
            let reading = self
                .field_aliases
                .get(&variable)
                .and_then(|keys| keys.lookup(row))
                .and_then(RawValue::as_number)
                .map(|v| v * self.scale(variable))
                .filter(|v| {
                    let ok = variable.accepts(*v);
                    if !ok {
                        warn!(
                            profile = %self.name,
                            field = variable.name(),
                            value = *v,
                            %timestamp,
                            "Discarding out-of-range reading"
                        );
                    }
                    ok
                });

            let value = match (reading, self.missing_policy) {
                (Some(v), _) => Some(v),
                (None, MissingPolicy::Zero) => Some(0.0),
                (None, MissingPolicy::Absent) => None,
            };
            sample.set(variable, value);
        }

        Ok(sample)
    }
}
