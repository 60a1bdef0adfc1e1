//! CSV input and output.
//!
//! Input columns are located by the names in [`ColumnConfig`]; every value is
//! parsed leniently so that a bad cell only costs its row during
//! [`prepare`](crate::pipeline::prepare), never the whole file. Columns the
//! model does not use are carried through to the output in input order.

use crate::config::{ColumnConfig, TowtConfig};
use crate::error::{Result, TowtError};
use crate::regression::PredictedRow;
use csv::StringRecord;
use std::io::{Read, Write};
use std::path::Path;

/// One input row before cleaning. `None` marks a missing or unparseable cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub account: Option<String>,
    /// Date text as found in the file; parsed during preparation.
    pub date: Option<String>,
    pub hour: Option<u32>,
    pub temperature: Option<f64>,
    pub usage: Option<f64>,
    pub treatment: Option<bool>,
    pub regressors: Vec<Option<f64>>,
    /// Cells of the unmodeled columns, in [`InputSchema`] order.
    pub passthrough: Vec<Option<String>>,
}

/// What an input column is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Id,
    Date,
    Hour,
    Temperature,
    Usage,
    Treatment,
    /// Index into the configured regressor list.
    Regressor(usize),
    /// Index into [`Observation::passthrough`](crate::core::Observation::passthrough).
    Passthrough(usize),
}

/// Input columns in file order, each with its role.
///
/// In daily runs the hour column is not modeled; when present it is carried
/// through like any other unmodeled column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSchema {
    columns: Vec<(String, ColumnRole)>,
}

impl InputSchema {
    /// Assign roles to a header row.
    ///
    /// # Errors
    /// [`TowtError::MissingAttribute`] naming the first configured column
    /// absent from the header.
    pub fn from_header<'a, I>(header: I, config: &TowtConfig) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let configured = configured_roles(config);
        let mut columns: Vec<(String, ColumnRole)> = Vec::new();
        let mut passthrough = 0;

        for name in header {
            let name = name.trim();
            let role = configured
                .iter()
                .find(|(n, role)| *n == name && !columns.iter().any(|(_, r)| r == role))
                .map(|(_, role)| *role)
                .unwrap_or_else(|| {
                    passthrough += 1;
                    ColumnRole::Passthrough(passthrough - 1)
                });
            columns.push((name.to_string(), role));
        }

        for (name, role) in &configured {
            if !columns.iter().any(|(_, r)| r == role) {
                return Err(TowtError::MissingAttribute(name.to_string()));
            }
        }
        Ok(Self { columns })
    }

    /// Layout with only the configured columns, for observations built in code.
    pub fn from_config(config: &TowtConfig) -> Self {
        Self {
            columns: configured_roles(config)
                .into_iter()
                .map(|(name, role)| (name.to_string(), role))
                .collect(),
        }
    }

    pub fn columns(&self) -> &[(String, ColumnRole)] {
        &self.columns
    }

    /// Names of the carried-through columns.
    pub fn passthrough_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, role)| matches!(role, ColumnRole::Passthrough(_)))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Output header: every input column, then `season` and `predicted`.
    pub fn output_header(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|(name, _)| name.clone())
            .chain(["season".to_string(), "predicted".to_string()])
            .collect()
    }
}

/// Configured columns in resolution order.
fn configured_roles(config: &TowtConfig) -> Vec<(&str, ColumnRole)> {
    let columns: &ColumnConfig = &config.columns;
    let mut roles = vec![(columns.id.as_str(), ColumnRole::Id), (columns.date.as_str(), ColumnRole::Date)];
    if !config.model.daily {
        roles.push((columns.hour.as_str(), ColumnRole::Hour));
    }
    roles.extend([
        (columns.usage.as_str(), ColumnRole::Usage),
        (columns.temperature.as_str(), ColumnRole::Temperature),
        (columns.treatment.as_str(), ColumnRole::Treatment),
    ]);
    roles.extend(
        config
            .model
            .regressors
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), ColumnRole::Regressor(i))),
    );
    roles
}

/// Parsed input: column layout plus raw rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvInput {
    pub schema: InputSchema,
    pub records: Vec<RawRecord>,
}

fn cell(record: &StringRecord, index: usize) -> Option<&str> {
    let value = record.get(index)?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("na") || value.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(value)
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_hour(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().or_else(|| {
        // hours exported as floats, e.g. "13.0"
        value
            .parse::<f64>()
            .ok()
            .filter(|h| h.fract() == 0.0 && *h >= 0.0 && *h <= 24.0)
            .map(|h| h as u32)
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => value.parse::<f64>().ok().map(|v| v != 0.0),
    }
}

fn parse_record(record: &StringRecord, schema: &InputSchema, config: &TowtConfig) -> RawRecord {
    let mut raw = RawRecord {
        regressors: vec![None; config.model.regressors.len()],
        passthrough: vec![None; schema.passthrough_names().len()],
        ..RawRecord::default()
    };

    for (index, (_, role)) in schema.columns.iter().enumerate() {
        let Some(value) = cell(record, index) else {
            continue;
        };
        match *role {
            ColumnRole::Id => raw.account = Some(value.to_owned()),
            ColumnRole::Date => raw.date = Some(value.to_owned()),
            ColumnRole::Hour => raw.hour = parse_hour(value),
            ColumnRole::Temperature => raw.temperature = parse_number(value),
            ColumnRole::Usage => raw.usage = parse_number(value),
            ColumnRole::Treatment => raw.treatment = parse_flag(value),
            ColumnRole::Regressor(i) => raw.regressors[i] = parse_number(value),
            ColumnRole::Passthrough(i) => raw.passthrough[i] = Some(value.to_owned()),
        }
    }
    raw
}

/// Read every row of a CSV stream.
///
/// # Errors
/// [`TowtError::MissingAttribute`] naming the first configured column absent
/// from the header. The hour column is only required for hourly runs.
pub fn read_records<R: Read>(reader: R, config: &TowtConfig) -> Result<CsvInput> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let schema = InputSchema::from_header(reader.headers()?.iter(), config)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(parse_record(&record, &schema, config));
    }
    Ok(CsvInput { schema, records })
}

pub fn read_records_from_path(path: impl AsRef<Path>, config: &TowtConfig) -> Result<CsvInput> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| TowtError::Io(format!("failed to open {}: {}", path.display(), e)))?;
    read_records(file, config)
}

/// Write predicted rows as CSV: the input columns in `schema` order, then
/// `season` and `predicted`.
pub fn write_predictions<W: Write>(
    writer: W,
    rows: &[PredictedRow],
    schema: &InputSchema,
    config: &TowtConfig,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(schema.output_header())?;

    for row in rows {
        let obs = &row.observation;
        let mut record: Vec<String> = schema
            .columns
            .iter()
            .map(|(_, role)| match *role {
                ColumnRole::Id => obs.account.clone(),
                ColumnRole::Date => obs.date.format(&config.columns.date_format).to_string(),
                ColumnRole::Hour => obs.hour.map(|h| h.to_string()).unwrap_or_default(),
                ColumnRole::Temperature => obs.temperature.to_string(),
                ColumnRole::Usage => obs.usage.to_string(),
                ColumnRole::Treatment => (if obs.treated { "1" } else { "0" }).to_string(),
                ColumnRole::Regressor(i) => {
                    obs.regressors.get(i).map(|v| v.to_string()).unwrap_or_default()
                }
                ColumnRole::Passthrough(i) => obs.passthrough.get(i).cloned().unwrap_or_default(),
            })
            .collect();
        record.push(obs.season.clone());
        record.push(row.predicted.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_predictions_to_path(
    path: impl AsRef<Path>,
    rows: &[PredictedRow],
    schema: &InputSchema,
    config: &TowtConfig,
) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .map_err(|e| TowtError::Io(format!("failed to create {}: {}", path.display(), e)))?;
    write_predictions(file, rows, schema, config)
}
