//! Month to season lookup.

use crate::error::{Result, TowtError};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Static mapping from calendar month (1-12) to a season label.
///
/// Deserializes from a TOML table keyed by month number as a string:
///
/// ```
/// use towt::core::SeasonMap;
///
/// let map: SeasonMap = toml::from_str(r#"
/// "1" = "winter"
/// "7" = "summer"
/// "#).unwrap();
/// assert_eq!(map.season_of(7), Some("summer"));
/// assert_eq!(map.season_of(3), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>")]
pub struct SeasonMap {
    labels: [Option<String>; 12],
}

impl SeasonMap {
    /// An empty map; every month is unassigned.
    pub fn empty() -> Self {
        Self {
            labels: Default::default(),
        }
    }

    /// Assign `label` to `month`, replacing any previous label.
    pub fn insert(&mut self, month: u32, label: impl Into<String>) -> Result<()> {
        if !(1..=12).contains(&month) {
            return Err(TowtError::InvalidParameter(format!(
                "season month must be in 1..=12, got {}",
                month
            )));
        }
        self.labels[(month - 1) as usize] = Some(label.into());
        Ok(())
    }

    /// Season label for a month, if mapped.
    pub fn season_of(&self, month: u32) -> Option<&str> {
        if !(1..=12).contains(&month) {
            return None;
        }
        self.labels[(month - 1) as usize].as_deref()
    }

    pub fn season_for_date(&self, date: NaiveDate) -> Option<&str> {
        self.season_of(date.month())
    }

    /// Number of months that carry a label.
    pub fn mapped_months(&self) -> usize {
        self.labels.iter().filter(|l| l.is_some()).count()
    }
}

impl Default for SeasonMap {
    /// Three seasons: winter-ish (Dec-Mar), shoulder (Apr-May, Oct-Nov), summer (Jun-Sep).
    fn default() -> Self {
        let mut map = Self::empty();
        for (month, label) in [
            (1, "1"),
            (2, "1"),
            (3, "1"),
            (4, "2"),
            (5, "2"),
            (6, "3"),
            (7, "3"),
            (8, "3"),
            (9, "3"),
            (10, "2"),
            (11, "2"),
            (12, "1"),
        ] {
            map.labels[month - 1] = Some(label.to_string());
        }
        map
    }
}

impl TryFrom<BTreeMap<String, String>> for SeasonMap {
    type Error = TowtError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self> {
        let mut map = Self::empty();
        for (key, label) in raw {
            let month: u32 = key.trim().parse().map_err(|_| {
                TowtError::InvalidParameter(format!("season key '{}' is not a month number", key))
            })?;
            map.insert(month, label)?;
        }
        Ok(map)
    }
}
