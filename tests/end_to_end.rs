//! CSV in, predictions out: whole-pipeline tests through the filesystem.

use approx::assert_relative_eq;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use towt::config::TowtConfig;
use towt::{io, pipeline, TowtError};

fn start() -> NaiveDate {
    // a Monday
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

/// Hourly usage driven only by hour-of-week, at a constant temperature.
fn hourly_csv() -> String {
    let mut csv = String::from("premise,date,hour,kwh,tempf,treatment\n");
    for day in 0..21 {
        let date = start() + Duration::days(day);
        let treated = day >= 14;
        for hour in 0..24 {
            let week = day / 7;
            let base = 1.0 + (day % 7) as f64 + hour as f64 / 10.0;
            let usage = if treated { base * 0.5 } else { base + week as f64 };
            writeln!(
                csv,
                "A,{},{},{},62.0,{}",
                date.format("%m/%d/%Y"),
                hour,
                usage,
                treated as u8
            )
            .unwrap();
        }
    }
    // an account with one baseline row for three calendar categories,
    // plus one unusable row
    for day in 0..3 {
        let date = start() + Duration::days(day);
        writeln!(csv, "B,{},5,2.0,40.0,{}", date.format("%m/%d/%Y"), (day > 0) as u8).unwrap();
    }
    csv.push_str("B,01/05/2023,6,NA,40.0,0\n");
    csv
}

#[test]
fn hourly_predictions_equal_hour_of_week_means() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("predictions.csv");
    fs::write(&input, hourly_csv()).unwrap();

    let config = TowtConfig::default();
    let parsed = io::read_records_from_path(&input, &config).unwrap();
    let report = pipeline::run_records(parsed.records, &config).unwrap();

    assert_eq!(report.dropped, 1);
    assert_eq!(report.accounts, 2);
    assert_eq!(report.fitted_models(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].account, "B");
    assert!(report.failures[0].error.is_insufficient_data());

    io::write_predictions_to_path(&output, &report.rows, &parsed.schema, &config).unwrap();

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        header,
        vec!["premise", "date", "hour", "kwh", "tempf", "treatment", "season", "predicted"]
    );

    let mut rows = 0;
    for record in reader.records() {
        let record = record.unwrap();
        let date = NaiveDate::parse_from_str(&record[1], "%m/%d/%Y").unwrap();
        let dow = date.weekday().num_days_from_monday() as f64;
        let hour: f64 = record[2].parse().unwrap();
        let predicted: f64 = record[7].parse().unwrap();

        // baseline weeks add 0 and 1 to the base profile
        let expected = 1.0 + dow + hour / 10.0 + 0.5;
        assert_relative_eq!(predicted, expected, epsilon = 1e-8);
        assert_eq!(&record[0], "A");
        assert_eq!(&record[6], "1");
        rows += 1;
    }
    assert_eq!(rows, 21 * 24);
}

#[test]
fn daily_run_from_toml_config_uses_regressors() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("towt.toml");
    fs::write(
        &config_path,
        r#"
        [columns]
        id = "site"
        usage = "usage"
        temperature = "temp"
        date_format = "%Y-%m-%d"

        [model]
        regressors = ["gp_1"]
        daily = true
        min_temp_count = 5
        "#,
    )
    .unwrap();
    let config = TowtConfig::from_file(&config_path).unwrap();

    // two sub-daily rows per day, collapsed to their mean
    let mut csv = String::from("site,date,hour,usage,temp,treatment,gp_1\n");
    let mut expected = HashMap::new();
    for day in 0..28 {
        let date = start() + Duration::days(day);
        let gp = ((day * 3) % 5) as f64;
        let usage = 5.0 + (day % 7) as f64 + 2.0 * gp;
        for (hour, offset) in [(1, -1.0), (2, 1.0)] {
            writeln!(
                csv,
                "S1,{},{},{},55.0,{},{}",
                date.format("%Y-%m-%d"),
                hour,
                usage + offset,
                (day >= 21) as u8,
                gp
            )
            .unwrap();
        }
        expected.insert(date, usage);
    }

    let parsed = io::read_records(csv.as_bytes(), &config).unwrap();
    let report = pipeline::run_records(parsed.records, &config).unwrap();
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.rows.len(), 28);
    assert_eq!(report.summaries[0].fit.design_columns, 8);

    for row in &report.rows {
        assert_eq!(row.observation.hour, None);
        assert_relative_eq!(
            row.predicted,
            expected[&row.observation.date],
            epsilon = 1e-8
        );
    }

    let mut out = Vec::new();
    io::write_predictions(&mut out, &report.rows, &parsed.schema, &config).unwrap();
    let text = String::from_utf8(out).unwrap();
    // the unmodeled hour column is averaged over the day and kept in place
    assert!(text.starts_with("site,date,hour,usage,temp,treatment,gp_1,season,predicted\n"));
    assert!(text.contains("\nS1,2023-01-02,1.5,5,55,0,0,1,"));
}

#[test]
fn missing_configured_column_fails_the_run() {
    let csv = "premise,date,hour,kwh,treatment\nA,01/02/2023,1,1.0,0\n";
    let err = io::read_records(csv.as_bytes(), &TowtConfig::default()).unwrap_err();
    assert_eq!(err, TowtError::MissingAttribute("tempf".into()));
}

#[test]
fn file_without_usable_rows_is_empty_data() {
    let csv = "premise,date,hour,kwh,tempf,treatment\nA,not a date,1,1.0,50,0\n";
    let config = TowtConfig::default();
    let parsed = io::read_records(csv.as_bytes(), &config).unwrap();
    assert_eq!(
        pipeline::run_records(parsed.records, &config).unwrap_err(),
        TowtError::EmptyData
    );
}

#[test]
fn unmodeled_columns_reach_the_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("predictions.csv");

    let mut csv = String::from("meter_id,premise,date,hour,kwh,tempf,treatment,feeder\n");
    for day in 0..21 {
        let date = start() + Duration::days(day);
        for hour in 0..24 {
            writeln!(
                csv,
                "M-{},A,{},{},{},62.0,{},F9",
                day,
                date.format("%m/%d/%Y"),
                hour,
                1.0 + hour as f64,
                (day >= 14) as u8
            )
            .unwrap();
        }
    }
    fs::write(&input, csv).unwrap();

    let mut config = TowtConfig::default();
    config.model.spline = towt::spline::SplineMethod::Static;
    let parsed = io::read_records_from_path(&input, &config).unwrap();
    assert_eq!(parsed.schema.passthrough_names(), vec!["meter_id", "feeder"]);

    let report = pipeline::run_records(parsed.records, &config).unwrap();
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    io::write_predictions_to_path(&output, &report.rows, &parsed.schema, &config).unwrap();

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        header,
        vec![
            "meter_id", "premise", "date", "hour", "kwh", "tempf", "treatment", "feeder",
            "season", "predicted"
        ]
    );

    let mut rows = 0;
    for record in reader.records() {
        let record = record.unwrap();
        assert!(record[0].starts_with("M-"));
        assert_eq!(&record[7], "F9");
        let hour: f64 = record[3].parse().unwrap();
        let predicted: f64 = record[9].parse().unwrap();
        assert_relative_eq!(predicted, 1.0 + hour, epsilon = 1e-8);
        rows += 1;
    }
    assert_eq!(rows, 21 * 24);
}
