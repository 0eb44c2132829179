//! PM2.5 to AQI conversion and the classifications derived from it.

use serde::Serialize;

/// `(pm_low, pm_high, aqi_low, aqi_high)` per segment, in µg/m³.
///
/// Concentrations past the last segment extrapolate along its slope.
const BREAKPOINTS: &[(f64, f64, f64, f64)] = &[
    (0.0, 12.0, 0.0, 50.0),
    (12.0, 35.4, 50.0, 100.0),
    (35.4, 55.4, 100.0, 150.0),
    (55.4, 150.4, 150.0, 200.0),
    (150.4, 250.4, 200.0, 300.0),
];

/// Converts a PM2.5 concentration into an AQI by breakpoint interpolation.
///
/// Rounds half away from zero. Negative or non-finite input yields 0.
pub fn aqi(pm25: f64) -> u32 {
    if !pm25.is_finite() || pm25 <= 0.0 {
        return 0;
    }

    let &(pm_low, pm_high, aqi_low, aqi_high) = BREAKPOINTS
        .iter()
        .find(|(_, pm_high, _, _)| pm25 <= *pm_high)
        .unwrap_or(&BREAKPOINTS[BREAKPOINTS.len() - 1]);

    let value = aqi_low + (aqi_high - aqi_low) / (pm_high - pm_low) * (pm25 - pm_low);
    value.round() as u32
}

/// AQI category.
///
/// | AQI       | Level                     |
/// |-----------|---------------------------|
/// | <= 50     | Good                      |
/// | <= 100    | Moderate                  |
/// | <= 150    | Unhealthy for Sensitive   |
/// | <= 200    | Unhealthy                 |
/// | > 200     | Very Unhealthy            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiLevel {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
}

impl AqiLevel {
    pub fn from_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => AqiLevel::Good,
            51..=100 => AqiLevel::Moderate,
            101..=150 => AqiLevel::UnhealthyForSensitive,
            151..=200 => AqiLevel::Unhealthy,
            _ => AqiLevel::VeryUnhealthy,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::UnhealthyForSensitive => "Unhealthy for Sensitive Groups",
            AqiLevel::Unhealthy => "Unhealthy",
            AqiLevel::VeryUnhealthy => "Very Unhealthy",
        }
    }
}

/// Respirator suggested for a given AQI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskAdvice {
    NotNeeded,
    N95,
    N99,
    P100,
}

impl MaskAdvice {
    pub fn for_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => MaskAdvice::NotNeeded,
            51..=100 => MaskAdvice::N95,
            101..=150 => MaskAdvice::N99,
            _ => MaskAdvice::P100,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MaskAdvice::NotNeeded => "No mask needed",
            MaskAdvice::N95 => "N95 respirator, filters 95% of particles",
            MaskAdvice::N99 => "N99 respirator, filters 99% of particles",
            MaskAdvice::P100 => "P100 respirator, avoid going out if possible",
        }
    }
}

/// An AQI value together with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AqiReading {
    pub aqi: u32,
    pub level: AqiLevel,
}

impl AqiReading {
    pub fn from_pm25(pm25: f64) -> Self {
        let aqi = aqi(pm25);
        AqiReading {
            aqi,
            level: AqiLevel::from_aqi(aqi),
        }
    }
}
