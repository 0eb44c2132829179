use std::collections::BTreeMap;

use serde::Serialize;

use crate::analytics::correlation::{Correlation, CorrelationStrength, pearson};
use crate::analytics::coverage::{DateRange, coverage_percent, date_range};
use crate::analytics::utility::{max, mean, median, min, stddev};
use crate::sample::Variable;
use crate::series::SampleSeries;

/// Variables summarized when the caller does not choose.
pub const DEFAULT_VARIABLES: &[Variable] = &[
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
];

/// Weather drivers correlated against PM2.5 by default.
pub const DEFAULT_CORRELATIONS: &[(Variable, Variable)] = &[
    (Variable::Temperature, Variable::Pm25),
    (Variable::Humidity, Variable::Pm25),
    (Variable::PressureMsl, Variable::Pm25),
    (Variable::WindSpeed, Variable::Pm25),
];

/// Descriptive statistics for one variable.
///
/// `mean` and `std_dev` are 0.0 when `count` is 0; the others are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariableStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

impl VariableStats {
    pub fn from_values(values: &[f64]) -> Self {
        let avg = mean(values);
        VariableStats {
            count: values.len(),
            mean: avg,
            std_dev: stddev(values, avg),
            min: min(values),
            max: max(values),
            median: median(values),
        }
    }
}

/// Correlation between two variables over the samples where both exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationEntry {
    pub a: Variable,
    pub b: Variable,
    pub pairs: usize,
    pub correlation: Correlation,
    pub strength: Option<CorrelationStrength>,
}

/// Which statistics to compute.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub variables: Vec<Variable>,
    pub correlations: Vec<(Variable, Variable)>,
    pub expected_hours: u32,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            variables: DEFAULT_VARIABLES.to_vec(),
            correlations: DEFAULT_CORRELATIONS.to_vec(),
            expected_hours: 24,
        }
    }
}

/// Everything derived from one series. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub record_count: usize,
    pub coverage_percent: u64,
    pub date_range: DateRange,
    pub variables: BTreeMap<Variable, VariableStats>,
    pub correlations: Vec<CorrelationEntry>,
}

impl StatisticsSummary {
    pub fn compute(series: &SampleSeries, options: &SummaryOptions) -> Self {
        let variables = options
            .variables
            .iter()
            .map(|v| (*v, VariableStats::from_values(&series.values(*v))))
            .collect();

        let correlations = options
            .correlations
            .iter()
            .map(|&(a, b)| {
                let (xs, ys) = series.paired_values(a, b);
                let correlation = pearson(&xs, &ys);
                CorrelationEntry {
                    a,
                    b,
                    pairs: xs.len(),
                    correlation,
                    strength: correlation.strength(),
                }
            })
            .collect();

        StatisticsSummary {
            record_count: series.len(),
            coverage_percent: coverage_percent(series.len(), options.expected_hours),
            date_range: date_range(series),
            variables,
            correlations,
        }
    }

    pub fn get(&self, variable: Variable) -> Option<&VariableStats> {
        self.variables.get(&variable)
    }

    pub fn correlation(&self, a: Variable, b: Variable) -> Option<Correlation> {
        self.correlations
            .iter()
            .find(|e| (e.a, e.b) == (a, b) || (e.a, e.b) == (b, a))
            .map(|e| e.correlation)
    }
}
