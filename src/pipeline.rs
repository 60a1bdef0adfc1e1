//! Batch driver: clean raw records into observations and fit every account.

use crate::config::TowtConfig;
use crate::core::Observation;
use crate::error::{Result, TowtError};
use crate::io::RawRecord;
use crate::regression::{FitFailure, FitSummary, PredictedRow, SeasonalRegressionEngine};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Cleaned observations ready for modeling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prepared {
    pub observations: Vec<Observation>,
    /// Input rows removed for missing values, bad dates or unmapped months.
    pub dropped: usize,
}

/// Summary of one fitted (account, season) model.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub account: String,
    pub fit: FitSummary,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Predictions grouped by account in ascending id order.
    pub rows: Vec<PredictedRow>,
    pub summaries: Vec<AccountSummary>,
    pub failures: Vec<FitFailure>,
    pub accounts: usize,
    pub dropped: usize,
}

impl BatchReport {
    pub fn fitted_models(&self) -> usize {
        self.summaries.len()
    }
}

fn clean(record: RawRecord, config: &TowtConfig) -> Option<Observation> {
    let account = record.account?;
    let date = NaiveDate::parse_from_str(record.date.as_deref()?, &config.columns.date_format).ok()?;
    let season = config.seasons.season_for_date(date)?;
    let regressors: Option<Vec<f64>> = record.regressors.into_iter().collect();
    let passthrough: Option<Vec<String>> = record.passthrough.into_iter().collect();

    let mut obs = Observation::new(account, date, record.temperature?, record.usage?)
        .with_treatment(record.treatment?)
        .with_season(season)
        .with_regressors(regressors?)
        .with_passthrough(passthrough?);
    if !config.model.daily {
        obs = obs.with_hour(record.hour?);
    }
    Some(obs)
}

/// One unmodeled cell for a collapsed day: the mean when every value is
/// numeric, the common value when all agree, empty otherwise.
fn collapse_cells(values: &[&str]) -> String {
    let numbers: Option<Vec<f64>> = values.iter().map(|v| v.parse::<f64>().ok()).collect();
    match numbers {
        Some(numbers) if !numbers.is_empty() => {
            (numbers.iter().sum::<f64>() / numbers.len() as f64).to_string()
        }
        _ if values.windows(2).all(|w| w[0] == w[1]) => {
            values.first().map(|v| v.to_string()).unwrap_or_default()
        }
        _ => String::new(),
    }
}

/// Mean of each field over the rows of one account and day.
fn collapse_day(rows: Vec<Observation>) -> Option<Observation> {
    let n = rows.len() as f64;
    let passthrough: Vec<String> = (0..rows.first()?.passthrough.len())
        .map(|i| {
            let cells: Vec<&str> = rows.iter().map(|o| o.passthrough[i].as_str()).collect();
            collapse_cells(&cells)
        })
        .collect();

    let mut iter = rows.into_iter();
    let mut day = iter.next()?;
    day.hour = None;
    day.passthrough = passthrough;
    for obs in iter {
        day.temperature += obs.temperature;
        day.usage += obs.usage;
        day.treated |= obs.treated;
        for (acc, v) in day.regressors.iter_mut().zip(&obs.regressors) {
            *acc += v;
        }
    }
    day.temperature /= n;
    day.usage /= n;
    for v in &mut day.regressors {
        *v /= n;
    }
    Some(day)
}

/// Turn raw rows into season-tagged observations.
///
/// Rows with a missing or unparseable value in any column, carried-through
/// columns included, or whose month has no season, are dropped and counted.
/// In daily runs the hour column is carried through, so a row with a blank
/// hour is dropped as well.
///
/// Daily runs then collapse each (account, date) to one row: means of the
/// modeled fields, treated when any row is treated, no modeled hour. Each
/// carried-through column becomes its mean when numeric, its value when
/// constant over the day, and empty otherwise.
pub fn prepare(records: Vec<RawRecord>, config: &TowtConfig) -> Prepared {
    let total = records.len();
    let cleaned: Vec<Observation> = records
        .into_iter()
        .filter_map(|r| clean(r, config))
        .collect();
    let dropped = total - cleaned.len();
    if dropped > 0 {
        warn!(dropped, total, "dropped rows with missing values or unmapped months");
    }

    let observations = if config.model.daily {
        let mut days: BTreeMap<(String, NaiveDate), Vec<Observation>> = BTreeMap::new();
        for obs in cleaned {
            days.entry((obs.account.clone(), obs.date)).or_default().push(obs);
        }
        days.into_values().filter_map(collapse_day).collect()
    } else {
        cleaned
    };

    debug!(rows = observations.len(), "prepared observations");
    Prepared {
        observations,
        dropped,
    }
}

/// Fit every account in parallel.
///
/// Accounts are independent; results are concatenated in ascending account
/// id order regardless of scheduling. Per-season failures are collected in
/// the report and never stop the batch.
pub fn run(observations: &[Observation], config: &TowtConfig) -> Result<BatchReport> {
    if observations.is_empty() {
        return Err(TowtError::EmptyData);
    }

    let mut by_account: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        by_account.entry(obs.account.as_str()).or_default().push(obs);
    }
    info!(
        accounts = by_account.len(),
        rows = observations.len(),
        spline = %config.model.spline,
        bin_scope = %config.model.bin_scope,
        "fitting accounts"
    );

    let engine = SeasonalRegressionEngine::new(config.model.clone());
    let results: Vec<_> = by_account
        .into_par_iter()
        .map(|(account, rows)| {
            let result = engine.run_account(account, &rows);
            (account.to_string(), result)
        })
        .collect();

    let mut report = BatchReport {
        accounts: results.len(),
        ..BatchReport::default()
    };
    for (account, result) in results {
        report.rows.extend(result.rows);
        report.summaries.extend(result.summaries.into_iter().map(|fit| AccountSummary {
            account: account.clone(),
            fit,
        }));
        report.failures.extend(result.failures);
    }

    info!(
        accounts = report.accounts,
        models = report.fitted_models(),
        failures = report.failures.len(),
        predictions = report.rows.len(),
        "batch finished"
    );
    Ok(report)
}

/// Prepare raw records and fit them.
pub fn run_records(records: Vec<RawRecord>, config: &TowtConfig) -> Result<BatchReport> {
    let prepared = prepare(records, config);
    let mut report = run(&prepared.observations, config)?;
    report.dropped = prepared.dropped;
    Ok(report)
}
