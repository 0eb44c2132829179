//! Canonical per-sample record and the variables it tracks.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Unit a wind speed reading was reported in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    #[default]
    KilometersPerHour,
    MetersPerSecond,
}

impl SpeedUnit {
    pub fn to_kmh(self, value: f64) -> f64 {
        match self {
            SpeedUnit::KilometersPerHour => value,
            SpeedUnit::MetersPerSecond => value * 3.6,
        }
    }
}

/// A numeric field of [`Sample`] that can be aggregated or correlated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Pm25,
    O3,
    So2,
    No2,
    Co,
    No,
    Nox,
    Temperature,
    Humidity,
    PressureMsl,
    WindSpeed,
    WindDirection,
    Precipitation,
    BoundaryLayerHeight,
    ShortwaveRadiation,
}

impl Variable {
    pub const ALL: [Variable; 15] = [
        Variable::Pm25,
        Variable::O3,
        Variable::So2,
        Variable::No2,
        Variable::Co,
        Variable::No,
        Variable::Nox,
        Variable::Temperature,
        Variable::Humidity,
        Variable::PressureMsl,
        Variable::WindSpeed,
        Variable::WindDirection,
        Variable::Precipitation,
        Variable::BoundaryLayerHeight,
        Variable::ShortwaveRadiation,
    ];

    pub fn is_pollutant(self) -> bool {
        matches!(
            self,
            Variable::Pm25
                | Variable::O3
                | Variable::So2
                | Variable::No2
                | Variable::Co
                | Variable::No
                | Variable::Nox
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Variable::Pm25 => "pm25",
            Variable::O3 => "o3",
            Variable::So2 => "so2",
            Variable::No2 => "no2",
            Variable::Co => "co",
            Variable::No => "no",
            Variable::Nox => "nox",
            Variable::Temperature => "temperature",
            Variable::Humidity => "humidity",
            Variable::PressureMsl => "pressure_msl",
            Variable::WindSpeed => "wind_speed",
            Variable::WindDirection => "wind_direction",
            Variable::Precipitation => "precipitation",
            Variable::BoundaryLayerHeight => "boundary_layer_height",
            Variable::ShortwaveRadiation => "shortwave_radiation",
        }
    }

    /// Whether `value` is physically plausible for this variable.
    pub fn accepts(self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            Variable::Temperature => true,
            Variable::Humidity => (0.0..=100.0).contains(&value),
            Variable::WindDirection => (0.0..=360.0).contains(&value),
            _ => value >= 0.0,
        }
    }
}

/// One normalized reading. Pollutants are in µg/m³.
///
/// Numeric fields are either a finite, valid number or `None`; the
/// normalizer never lets NaN through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: NaiveDateTime,

    pub pm25: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub no2: Option<f64>,
    pub co: Option<f64>,
    pub no: Option<f64>,
    pub nox: Option<f64>,

    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure_msl: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_speed_unit: SpeedUnit,
    pub wind_direction: Option<f64>,
    pub precipitation: Option<f64>,
    pub boundary_layer_height: Option<f64>,
    pub shortwave_radiation: Option<f64>,

    // always derived from `timestamp`
    pub hour_of_day: u32,
    pub is_weekend: bool,
}

impl Sample {
    /// An otherwise empty sample at `timestamp`, with calendar fields filled in.
    pub fn at(timestamp: NaiveDateTime) -> Self {
        Sample {
            timestamp,
            pm25: None,
            o3: None,
            so2: None,
            no2: None,
            co: None,
            no: None,
            nox: None,
            temperature: None,
            humidity: None,
            pressure_msl: None,
            wind_speed: None,
            wind_speed_unit: SpeedUnit::default(),
            wind_direction: None,
            precipitation: None,
            boundary_layer_height: None,
            shortwave_radiation: None,
            hour_of_day: timestamp.hour(),
            is_weekend: matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }

    pub fn get(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::Pm25 => self.pm25,
            Variable::O3 => self.o3,
            Variable::So2 => self.so2,
            Variable::No2 => self.no2,
            Variable::Co => self.co,
            Variable::No => self.no,
            Variable::Nox => self.nox,
            Variable::Temperature => self.temperature,
            Variable::Humidity => self.humidity,
            Variable::PressureMsl => self.pressure_msl,
            Variable::WindSpeed => self.wind_speed,
            Variable::WindDirection => self.wind_direction,
            Variable::Precipitation => self.precipitation,
            Variable::BoundaryLayerHeight => self.boundary_layer_height,
            Variable::ShortwaveRadiation => self.shortwave_radiation,
        }
    }

    pub(crate) fn set(&mut self, variable: Variable, value: Option<f64>) {
        let slot = match variable {
            Variable::Pm25 => &mut self.pm25,
            Variable::O3 => &mut self.o3,
            Variable::So2 => &mut self.so2,
            Variable::No2 => &mut self.no2,
            Variable::Co => &mut self.co,
            Variable::No => &mut self.no,
            Variable::Nox => &mut self.nox,
            Variable::Temperature => &mut self.temperature,
            Variable::Humidity => &mut self.humidity,
            Variable::PressureMsl => &mut self.pressure_msl,
            Variable::WindSpeed => &mut self.wind_speed,
            Variable::WindDirection => &mut self.wind_direction,
            Variable::Precipitation => &mut self.precipitation,
            Variable::BoundaryLayerHeight => &mut self.boundary_layer_height,
            Variable::ShortwaveRadiation => &mut self.shortwave_radiation,
        };
        *slot = value;
    }

    pub fn wind_speed_kmh(&self) -> Option<f64> {
        self.wind_speed.map(|v| self.wind_speed_unit.to_kmh(v))
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a source timestamp as local wall-clock time.
///
/// RFC 3339 input keeps its wall-clock reading; the offset is dropped.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Interprets a numeric cell as Unix epoch seconds.
pub fn timestamp_from_epoch(seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp(seconds.trunc() as i64, 0).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_fields_are_derived() {
        // 2024-06-01 was a Saturday
        let ts = parse_timestamp("2024-06-01T14:30:00").unwrap();
        let sample = Sample::at(ts);
        assert_eq!(sample.hour_of_day, 14);
        assert!(sample.is_weekend);

        let monday = Sample::at(parse_timestamp("2024-06-03 23:00:00").unwrap());
        assert_eq!(monday.hour_of_day, 23);
        assert!(!monday.is_weekend);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(7, 15, 0)
            .unwrap();

        assert_eq!(parse_timestamp("2024-03-05T07:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05 07:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T07:15"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T07:15:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T07:15:00-06:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-05"),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_timestamp_from_epoch() {
        let ts = timestamp_from_epoch(0.0).unwrap();
        assert_eq!(ts.to_string(), "1970-01-01 00:00:00");
        assert_eq!(timestamp_from_epoch(f64::NAN), None);
    }

    #[test]
    fn test_variable_ranges() {
        assert!(Variable::Temperature.accepts(-12.0));
        assert!(!Variable::Pm25.accepts(-0.1));
        assert!(!Variable::Humidity.accepts(101.0));
        assert!(!Variable::WindDirection.accepts(361.0));
        assert!(!Variable::Co.accepts(f64::INFINITY));
    }

    #[test]
    fn test_wind_speed_kmh() {
        let mut sample = Sample::at(parse_timestamp("2024-01-01T00:00:00").unwrap());
        sample.wind_speed = Some(10.0);
        sample.wind_speed_unit = SpeedUnit::MetersPerSecond;
        assert_eq!(sample.wind_speed_kmh(), Some(36.0));
    }

    #[test]
    fn test_get_set_roundtrip_covers_all_variables() {
        let mut sample = Sample::at(parse_timestamp("2024-01-01T00:00:00").unwrap());
        for (i, v) in Variable::ALL.iter().enumerate() {
            sample.set(*v, Some(i as f64));
        }
        for (i, v) in Variable::ALL.iter().enumerate() {
            assert_eq!(sample.get(*v), Some(i as f64), "{}", v.name());
        }
    }
}
