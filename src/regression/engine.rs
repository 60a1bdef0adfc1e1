//! Per-account, per-season TOWT fitting and prediction.

use super::design::build_design;
use super::ols::{ols_fit_with_required, ols_residuals, OlsFit};
use crate::binning::DynamicBinSelector;
use crate::config::ModelConfig;
use crate::core::Observation;
use crate::error::{Result, TowtError};
use crate::spline::{DynamicSpline, SplineMethod, StaticSpline, TemperatureSpline};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Which baseline rows the dynamic bin selector sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinScope {
    /// Cutpoints selected separately for each season subset.
    #[default]
    Season,
    /// One set of cutpoints per account, shared by all its seasons.
    Account,
}

impl fmt::Display for BinScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinScope::Season => write!(f, "season"),
            BinScope::Account => write!(f, "account"),
        }
    }
}

impl FromStr for BinScope {
    type Err = TowtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "season" => Ok(BinScope::Season),
            "account" => Ok(BinScope::Account),
            other => Err(TowtError::InvalidParameter(format!(
                "unknown bin scope '{}', expected 'season' or 'account'",
                other
            ))),
        }
    }
}

/// An observation together with its counterfactual prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedRow {
    pub observation: Observation,
    pub predicted: f64,
}

/// A (account, season) model that could not be fitted.
#[derive(Debug, Clone, PartialEq)]
pub struct FitFailure {
    pub account: String,
    pub season: String,
    pub error: TowtError,
}

/// Goodness of fit on the baseline rows of one season model.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    pub season: String,
    pub baseline_rows: usize,
    pub total_rows: usize,
    pub design_columns: usize,
    /// Temperature or regressor columns with no variation beyond the
    /// calendar indicators on baseline rows; their coefficient is zero.
    pub dropped_columns: Vec<String>,
    /// Coefficient of variation of the baseline RMSE.
    pub cv_rmse: f64,
    pub r_squared: f64,
}

/// A fitted season model and its predictions for every row of the season.
#[derive(Debug, Clone)]
pub struct SeasonFit {
    pub model: OlsFit,
    /// Predictions aligned with the season's input rows.
    pub predictions: Vec<f64>,
    pub summary: FitSummary,
}

/// Output of one account: predictions for every fitted season plus failures.
#[derive(Debug, Clone, Default)]
pub struct AccountResult {
    pub rows: Vec<PredictedRow>,
    pub summaries: Vec<FitSummary>,
    pub failures: Vec<FitFailure>,
}

/// Fits an independent OLS model per season of one account.
#[derive(Debug, Clone)]
pub struct SeasonalRegressionEngine {
    config: ModelConfig,
}

impl SeasonalRegressionEngine {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Spline for a set of rows, choosing dynamic knots from their baseline rows.
    pub fn spline_for(&self, rows: &[&Observation]) -> Result<Box<dyn TemperatureSpline>> {
        match self.config.spline {
            SplineMethod::Static => Ok(Box::new(StaticSpline)),
            SplineMethod::Dynamic => {
                let selector = DynamicBinSelector::new(self.config.min_temp_count);
                let cuts = selector.select_for_account(
                    rows.iter().filter(|o| o.is_baseline()).map(|o| o.temperature),
                )?;
                Ok(Box::new(DynamicSpline::new(cuts)))
            }
        }
    }

    /// Fit on the baseline rows of `rows` and predict all of them.
    ///
    /// Every calendar indicator needs baseline support; a level seen only in
    /// treatment rows makes the season singular. Spline and regressor columns
    /// that are constant (or zero) beyond the indicators are dropped.
    pub fn fit_season(
        &self,
        season: &str,
        rows: &[&Observation],
        spline: &dyn TemperatureSpline,
    ) -> Result<SeasonFit> {
        if rows.is_empty() {
            return Err(TowtError::EmptyData);
        }

        let (design, n_calendar) = build_design(
            rows,
            self.config.granularity(),
            spline,
            &self.config.regressors,
        )?;

        let baseline: Vec<bool> = rows.iter().map(|o| o.is_baseline()).collect();
        let train = design.filter_rows(&baseline)?;
        let y: Vec<f64> = rows
            .iter()
            .filter(|o| o.is_baseline())
            .map(|o| o.usage)
            .collect();

        if y.is_empty() {
            return Err(TowtError::InsufficientData { needed: 1, got: 0 });
        }

        let model = ols_fit_with_required(&y, &train, n_calendar)?;
        let predictions = model.predict(&design)?;
        let residuals = ols_residuals(&y, &model, &train)?;

        let summary = FitSummary {
            season: season.to_string(),
            baseline_rows: y.len(),
            total_rows: rows.len(),
            design_columns: design.n_cols(),
            dropped_columns: model.dropped.clone(),
            cv_rmse: cv_rmse(&y, &residuals),
            r_squared: r_squared(&y, &residuals),
        };

        debug!(
            season,
            calendar_columns = n_calendar,
            spline_columns = spline.num_columns(),
            dropped_columns = summary.dropped_columns.len(),
            baseline_rows = summary.baseline_rows,
            cv_rmse = summary.cv_rmse,
            "fitted season model"
        );

        Ok(SeasonFit {
            model,
            predictions,
            summary,
        })
    }

    /// Fit every season of one account's rows.
    ///
    /// Seasons run in order of first appearance; each failure is recorded and
    /// the remaining seasons still run.
    pub fn run_account(&self, account: &str, observations: &[&Observation]) -> AccountResult {
        let mut result = AccountResult::default();

        let mut seasons: Vec<&str> = Vec::new();
        for obs in observations {
            if !seasons.contains(&obs.season.as_str()) {
                seasons.push(&obs.season);
            }
        }

        let account_spline = match self.config.bin_scope {
            BinScope::Account => {
                Some(self.spline_for(observations))
            }
            BinScope::Season => None,
        };

        for season in seasons {
            let rows: Vec<&Observation> = observations
                .iter()
                .copied()
                .filter(|o| o.season == season)
                .collect();

            let fitted = match &account_spline {
                Some(Ok(spline)) => self.fit_season(season, &rows, spline.as_ref()),
                Some(Err(e)) => Err(e.clone()),
                None => self
                    .spline_for(&rows)
                    .and_then(|spline| self.fit_season(season, &rows, spline.as_ref())),
            };

            match fitted {
                Ok(fit) => {
                    result
                        .rows
                        .extend(rows.iter().zip(&fit.predictions).map(|(obs, &predicted)| {
                            PredictedRow {
                                observation: (*obs).clone(),
                                predicted,
                            }
                        }));
                    result.summaries.push(fit.summary);
                }
                Err(error) => {
                    warn!(account, season, %error, "season model not fitted");
                    result.failures.push(FitFailure {
                        account: account.to_string(),
                        season: season.to_string(),
                        error,
                    });
                }
            }
        }

        result
    }
}

fn cv_rmse(y: &[f64], residuals: &[f64]) -> f64 {
    let n = y.len() as f64;
    let mean = y.iter().sum::<f64>() / n;
    let rmse = (residuals.iter().map(|r| r * r).sum::<f64>() / n).sqrt();
    if mean == 0.0 {
        f64::NAN
    } else {
        rmse / mean
    }
}

fn r_squared(y: &[f64], residuals: &[f64]) -> f64 {
    let n = y.len() as f64;
    let mean = y.iter().sum::<f64>() / n;
    let ss_tot: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    }
}
