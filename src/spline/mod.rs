//! Piecewise-linear temperature bases.
//!
//! Both variants turn a temperature into a handful of basis values whose sum
//! is a continuous piecewise-linear function of temperature with knots at the
//! cutpoints. The static variant uses fixed knots; the dynamic variant uses
//! account-specific [`Cutpoints`](crate::binning::Cutpoints).

mod dynamic;
mod fixed;

pub use dynamic::DynamicSpline;
pub use fixed::{StaticSpline, STATIC_KNOTS};

use crate::error::TowtError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// How temperature knots are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplineMethod {
    /// Fixed knots at 50, 60 and 70 degrees.
    Static,
    /// Knots selected per account from baseline temperatures.
    #[default]
    Dynamic,
}

impl fmt::Display for SplineMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplineMethod::Static => write!(f, "static"),
            SplineMethod::Dynamic => write!(f, "dynamic"),
        }
    }
}

impl FromStr for SplineMethod {
    type Err = TowtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(SplineMethod::Static),
            "dynamic" => Ok(SplineMethod::Dynamic),
            other => Err(TowtError::InvalidParameter(format!(
                "unknown spline method '{}', expected 'static' or 'dynamic'",
                other
            ))),
        }
    }
}

/// A temperature basis expansion.
pub trait TemperatureSpline {
    /// Names of the basis columns, in order.
    fn column_names(&self) -> Vec<String>;

    /// Basis values for one temperature.
    fn basis(&self, temperature: f64) -> Vec<f64>;

    /// Number of basis columns.
    fn num_columns(&self) -> usize {
        self.column_names().len()
    }

    /// Column-major basis for a slice of temperatures: `out[column][row]`.
    fn basis_columns(&self, temperatures: &[f64]) -> Vec<Vec<f64>> {
        let k = self.num_columns();
        let mut columns = vec![Vec::with_capacity(temperatures.len()); k];
        for &t in temperatures {
            for (col, value) in columns.iter_mut().zip(self.basis(t)) {
                col.push(value);
            }
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spline_method_parses_case_insensitively() {
        assert_eq!("static".parse::<SplineMethod>().unwrap(), SplineMethod::Static);
        assert_eq!(" Dynamic ".parse::<SplineMethod>().unwrap(), SplineMethod::Dynamic);
        assert!("cubic".parse::<SplineMethod>().is_err());
    }

    #[test]
    fn spline_method_round_trips_through_display() {
        for method in [SplineMethod::Static, SplineMethod::Dynamic] {
            assert_eq!(method.to_string().parse::<SplineMethod>().unwrap(), method);
        }
    }

    #[test]
    fn basis_columns_are_column_major() {
        let spline = StaticSpline;
        let cols = spline.basis_columns(&[40.0, 75.0]);
        assert_eq!(cols.len(), 4);
        assert_eq!(cols[0], vec![40.0, 50.0]);
        assert_eq!(cols[3], vec![0.0, 5.0]);
    }
}
