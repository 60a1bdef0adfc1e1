//! Seasonal TOWT regression: design assembly, least squares and the
//! per-account fitting engine.

mod design;
mod engine;
mod ols;

pub use design::{build_design, calendar_categories, calendar_dummies, calendar_prefix};
pub use engine::{
    AccountResult, BinScope, FitFailure, FitSummary, PredictedRow, SeasonFit,
    SeasonalRegressionEngine,
};
pub use ols::{ols_fit, ols_fit_with_required, ols_residuals, DesignMatrix, OlsFit};
