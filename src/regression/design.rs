//! Design matrix assembly: calendar indicators, spline basis, auxiliary regressors.

use super::ols::DesignMatrix;
use crate::core::{Granularity, Observation};
use crate::error::{Result, TowtError};
use crate::spline::TemperatureSpline;

/// Calendar category of each row: hour-of-week for sub-daily data,
/// day-of-week for daily data.
pub fn calendar_categories(rows: &[&Observation], granularity: Granularity) -> Result<Vec<u32>> {
    rows.iter()
        .map(|obs| match granularity {
            Granularity::Daily => Ok(obs.day_of_week()),
            Granularity::Hourly => obs.hour_of_week().ok_or_else(|| {
                TowtError::MissingAttribute(format!(
                    "hour (account {}, {})",
                    obs.account, obs.date
                ))
            }),
        })
        .collect()
}

/// Column name prefix for the calendar indicators.
pub fn calendar_prefix(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Hourly => "how",
        Granularity::Daily => "dow",
    }
}

/// Indicator columns, one per distinct category, in ascending category order.
///
/// No reference level is dropped.
pub fn calendar_dummies(categories: &[u32], prefix: &str) -> Vec<(String, Vec<f64>)> {
    let mut levels: Vec<u32> = categories.to_vec();
    levels.sort_unstable();
    levels.dedup();

    levels
        .into_iter()
        .map(|level| {
            let column = categories
                .iter()
                .map(|&c| if c == level { 1.0 } else { 0.0 })
                .collect();
            (format!("{}_{}", prefix, level), column)
        })
        .collect()
}

/// Design for one season subset: `[calendar dummies, spline, regressors]`.
///
/// Returns the matrix and the number of leading calendar columns.
pub fn build_design(
    rows: &[&Observation],
    granularity: Granularity,
    spline: &dyn TemperatureSpline,
    regressor_names: &[String],
) -> Result<(DesignMatrix, usize)> {
    let mut design = DesignMatrix::new(rows.len());

    let categories = calendar_categories(rows, granularity)?;
    let dummies = calendar_dummies(&categories, calendar_prefix(granularity));
    let n_calendar = dummies.len();
    for (name, column) in dummies {
        design.push_column(name, column)?;
    }

    let temperatures: Vec<f64> = rows.iter().map(|o| o.temperature).collect();
    for (name, column) in spline
        .column_names()
        .into_iter()
        .zip(spline.basis_columns(&temperatures))
    {
        design.push_column(name, column)?;
    }

    for (i, name) in regressor_names.iter().enumerate() {
        let mut column = Vec::with_capacity(rows.len());
        for obs in rows {
            let value = obs.regressors.get(i).copied().ok_or(TowtError::DimensionMismatch {
                expected: regressor_names.len(),
                got: obs.regressors.len(),
            })?;
            column.push(value);
        }
        design.push_column(name.clone(), column)?;
    }

    Ok((design, n_calendar))
}
