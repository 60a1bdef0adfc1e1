//! Prepared observations: one metered interval for one account.

use chrono::{Datelike, NaiveDate};

/// Temporal resolution of the modeled data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// Sub-daily (typically hourly) rows; calendar effects by hour-of-week.
    #[default]
    Hourly,
    /// One row per account and day; calendar effects by day-of-week.
    Daily,
}

impl Granularity {
    pub fn from_daily_flag(daily: bool) -> Self {
        if daily {
            Granularity::Daily
        } else {
            Granularity::Hourly
        }
    }
}

/// A single cleaned, season-tagged row of metered data.
///
/// Observations are immutable once prepared; spline values and predictions
/// are derived alongside them rather than stored on them.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Account (premise) identifier.
    pub account: String,
    /// Calendar date of the interval.
    pub date: NaiveDate,
    /// Hour of day as supplied (1-24 or 0-23); `None` for daily rows.
    pub hour: Option<u32>,
    /// Outdoor temperature.
    pub temperature: f64,
    /// Metered usage.
    pub usage: f64,
    /// Whether the row belongs to the treatment (post-intervention) period.
    pub treated: bool,
    /// Season label assigned from the calendar month.
    pub season: String,
    /// Auxiliary regressor values, ordered like the configured regressor names.
    pub regressors: Vec<f64>,
    /// Unmodeled input cells, carried through to the output unchanged.
    pub passthrough: Vec<String>,
}

impl Observation {
    /// Create a baseline observation without hour, season or regressors.
    pub fn new(account: impl Into<String>, date: NaiveDate, temperature: f64, usage: f64) -> Self {
        Self {
            account: account.into(),
            date,
            hour: None,
            temperature,
            usage,
            treated: false,
            season: String::new(),
            regressors: Vec::new(),
            passthrough: Vec::new(),
        }
    }

    pub fn with_hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        self.season = season.into();
        self
    }

    pub fn with_treatment(mut self, treated: bool) -> Self {
        self.treated = treated;
        self
    }

    pub fn with_regressors(mut self, regressors: Vec<f64>) -> Self {
        self.regressors = regressors;
        self
    }

    pub fn with_passthrough(mut self, passthrough: Vec<String>) -> Self {
        self.passthrough = passthrough;
        self
    }

    /// True for rows used to fit the model.
    pub fn is_baseline(&self) -> bool {
        !self.treated
    }

    /// Day of week, Monday = 0.
    pub fn day_of_week(&self) -> u32 {
        self.date.weekday().num_days_from_monday()
    }

    /// Hour-of-week category: `day_of_week * 24 + hour`.
    pub fn hour_of_week(&self) -> Option<u32> {
        self.hour.map(|h| self.day_of_week() * 24 + h)
    }
}
