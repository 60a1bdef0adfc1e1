//! # towt
//!
//! Time-of-week-and-temperature (TOWT) counterfactual baselines for measured
//! energy savings.
//!
//! For every account and season, usage on baseline (pre-intervention) rows is
//! regressed on calendar indicators, a piecewise-linear temperature basis and
//! optional auxiliary regressors. The fitted model then predicts what usage
//! would have been on every row, treatment period included.
//!
//! Temperature knots are either fixed at 50/60/70 degrees or chosen per
//! account by merging sparse bins of a 7-bin histogram
//! ([`binning::DynamicBinSelector`]).
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//! use towt::prelude::*;
//!
//! let mut config = TowtConfig::default();
//! config.model.daily = true;
//! config.model.min_temp_count = 5;
//!
//! let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
//! let observations: Vec<Observation> = (0..28)
//!     .map(|i| {
//!         let date = start + Duration::days(i);
//!         Observation::new("site-1", date, 40.0, 10.0 + (i % 7) as f64)
//!             .with_season("1")
//!             .with_treatment(i >= 21)
//!     })
//!     .collect();
//!
//! let report = towt::pipeline::run(&observations, &config).unwrap();
//! assert!(report.failures.is_empty());
//! assert_eq!(report.rows.len(), 28);
//! ```

#![allow(clippy::needless_range_loop)]

pub mod binning;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod regression;
pub mod spline;

pub use error::{Result, TowtError};

pub mod prelude {
    pub use crate::binning::{Cutpoints, DynamicBinSelector, FinalBin};
    pub use crate::config::TowtConfig;
    pub use crate::core::{Granularity, Observation, SeasonMap};
    pub use crate::error::{Result, TowtError};
    pub use crate::io::{CsvInput, InputSchema, RawRecord};
    pub use crate::pipeline::{BatchReport, Prepared};
    pub use crate::regression::{BinScope, FitFailure, PredictedRow, SeasonalRegressionEngine};
    pub use crate::spline::{DynamicSpline, SplineMethod, StaticSpline, TemperatureSpline};
}
