use serde::Serialize;

/// Why a correlation could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// One of the series does not vary, so the denominator is zero.
    ZeroVariance,
    /// The series have different lengths.
    LengthMismatch,
    /// There is nothing to correlate.
    Empty,
}

/// A Pearson coefficient, or the reason there isn't one.
///
/// An undefined correlation is never reported as `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Correlation {
    Defined(f64),
    Undefined(UndefinedReason),
}

impl Correlation {
    pub fn value(self) -> Option<f64> {
        match self {
            Correlation::Defined(r) => Some(r),
            Correlation::Undefined(_) => None,
        }
    }

    pub fn strength(self) -> Option<CorrelationStrength> {
        self.value().map(CorrelationStrength::from_coefficient)
    }
}

/// Qualitative strength of `|r|`.
///
/// | \|r\|   | Strength |
/// |---------|----------|
/// | > 0.7   | Strong   |
/// | > 0.4   | Moderate |
/// | > 0.2   | Weak     |
/// | else    | None     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
    None,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        match r.abs() {
            a if a > 0.7 => CorrelationStrength::Strong,
            a if a > 0.4 => CorrelationStrength::Moderate,
            a if a > 0.2 => CorrelationStrength::Weak,
            _ => CorrelationStrength::None,
        }
    }
}

/// Pearson correlation coefficient of two equal-length series.
///
/// `(nΣxy − ΣxΣy) / sqrt((nΣx² − (Σx)²)(nΣy² − (Σy)²))`, clamped to
/// `[-1, 1]` to absorb rounding.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Correlation {
    if xs.len() != ys.len() {
        return Correlation::Undefined(UndefinedReason::LengthMismatch);
    }
    if xs.is_empty() {
        return Correlation::Undefined(UndefinedReason::Empty);
    }

    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let sum_x2: f64 = xs.iter().map(|x| x * x).sum();
    let sum_y2: f64 = ys.iter().map(|y| y * y).sum();

    let var_x = n * sum_x2 - sum_x * sum_x;
    let var_y = n * sum_y2 - sum_y * sum_y;

    // cancellation leaves a tiny residue for constant input
    if var_x <= n * sum_x2 * 1e-12 || var_y <= n * sum_y2 * 1e-12 {
        return Correlation::Undefined(UndefinedReason::ZeroVariance);
    }

    let r = (n * sum_xy - sum_x * sum_y) / (var_x * var_y).sqrt();
    Correlation::Defined(r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_self_correlation_is_one() {
        let xs = [3.0, 7.5, 1.0, 12.25, 9.0];
        let r = pearson(&xs, &xs).value().unwrap();
        assert!(approx(r, 1.0));
    }

    #[test]
    fn test_perfect_negative() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [8.0, 6.0, 4.0, 2.0];
        assert!(approx(pearson(&xs, &ys).value().unwrap(), -1.0));
    }

    #[test]
    fn test_known_value() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 5.0, 4.0, 5.0];
        // n·Σxy − ΣxΣy = 5·66 − 15·20 = 30; sqrt((5·55 − 225)(5·86 − 400)) = sqrt(50·30)
        let expected = 30.0 / (1500.0f64).sqrt();
        assert!(approx(pearson(&xs, &ys).value().unwrap(), expected));
    }

    #[test]
    fn test_constant_series_is_undefined_not_zero() {
        let xs = [1.0, 2.0, 3.0];
        let flat = [4.2, 4.2, 4.2];
        let r = pearson(&xs, &flat);
        assert_eq!(r, Correlation::Undefined(UndefinedReason::ZeroVariance));
        assert_eq!(r.value(), None);
        assert_eq!(r.strength(), None);
    }

    #[test]
    fn test_single_point_is_undefined() {
        assert_eq!(
            pearson(&[1.0], &[2.0]),
            Correlation::Undefined(UndefinedReason::ZeroVariance)
        );
    }

    #[test]
    fn test_length_mismatch_and_empty() {
        assert_eq!(
            pearson(&[1.0, 2.0], &[1.0]),
            Correlation::Undefined(UndefinedReason::LengthMismatch)
        );
        assert_eq!(
            pearson(&[], &[]),
            Correlation::Undefined(UndefinedReason::Empty)
        );
    }

    #[test]
    fn test_strength_labels() {
        assert_eq!(CorrelationStrength::from_coefficient(-0.85), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_coefficient(0.7), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_coefficient(0.3), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_coefficient(0.2), CorrelationStrength::None);
    }
}
