//! Integration tests for the bulk CSV error pipeline
//!
//! CSV exports on disk run through the CSV fetcher, the controller and the
//! body error analyzer; report files are checked on disk.

use loglens::core::analyze::BodyErrorAnalyzer;
use loglens::core::controller::Controller;
use loglens::core::fetch::{CsvFetcher, CsvSource};
use loglens::domain::{FetchError, LoglensError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn test_three_rows_produce_expected_reports() {
    let dir = TempDir::new().unwrap();
    let totals = write(&dir, "totals.csv", "time,value\n2023-09-08,4\n2023-09-09,2\n");
    let errors = write(
        &dir,
        "errors.csv",
        "Date,@Body.Attributes.metadata.error,@Body.message\n\
         \"2023-09-08T10:15:00.000Z\",\"Timeout: upstream took too long\",\n\
         2023-09-08T12:00:00.000Z,Timeout: again,\n\
         2023-09-09T08:30:00.000Z,,\"Parse: unexpected token\"\n",
    );

    let fetcher = CsvFetcher::new(
        vec![CsvSource::daily_totals(&totals), CsvSource::body_errors(&errors)],
        100_000_000,
    );
    let outcome = Controller::new(fetcher, BodyErrorAnalyzer::default())
        .with_channel_capacity(1)
        .run()
        .await
        .unwrap();

    let errors_out = dir.path().join("out_errors.csv");
    let counts_out = dir.path().join("out_counts.csv");
    let percentages_out = dir.path().join("out_percentages.csv");
    outcome
        .report
        .write_files(&errors_out, &counts_out, &percentages_out)
        .unwrap();

    assert_eq!(read(&errors_out), "error,count\nTimeout,2\nParse,1\n");
    assert_eq!(
        read(&counts_out),
        "error type/datetime,2023-09-08,2023-09-09\nTimeout,2,\nParse,,1\n"
    );
    assert_eq!(
        read(&percentages_out),
        "error type/datetime,2023-09-08,2023-09-09\nTimeout,0.5,\nParse,,0.5\n"
    );

    assert_eq!(outcome.summary.records_fetched, 5);
    assert_eq!(outcome.summary.records_consumed, 5);
    assert_eq!(outcome.summary.windows, 0);
}

#[tokio::test]
async fn test_generic_error_variants_share_a_bucket() {
    let dir = TempDir::new().unwrap();
    let errors = write(
        &dir,
        "errors.csv",
        "Date,@Body.Attributes.metadata.error\n\
         2023-09-08T00:00:00Z,Error: foo\n\
         2023-09-08T00:00:01Z,error: bar\n\
         2023-09-09T00:00:00Z,ERROR\n\
         2023-09-09T00:00:01Z,CustomError:detail\n\
         2023-09-09T00:00:02Z,\n",
    );

    let fetcher = CsvFetcher::new(vec![CsvSource::body_errors(&errors)], 1024);
    let outcome = Controller::new(fetcher, BodyErrorAnalyzer::default())
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome.report.errors(),
        &[("error".to_string(), 3), ("CustomError".to_string(), 1)]
    );
    assert_eq!(outcome.report.total(), 4);
    assert_eq!(outcome.summary.records_consumed, 5);
}

#[tokio::test]
async fn test_malformed_totals_abort_the_run() {
    let dir = TempDir::new().unwrap();
    let totals = write(&dir, "totals.csv", "time,value\n2023-09-08,many\n");
    let errors = write(&dir, "errors.csv", "Date,@Body.message\n2023-09-08T00:00:00Z,Oops\n");

    let fetcher = CsvFetcher::new(
        vec![CsvSource::daily_totals(&totals), CsvSource::body_errors(&errors)],
        1024,
    );
    let result = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        Controller::new(fetcher, BodyErrorAnalyzer::default()).run(),
    )
    .await
    .expect("pipeline hung on malformed input");

    assert!(matches!(
        result,
        Err(LoglensError::Fetch(FetchError::MalformedRecord { line: 2, .. }))
    ));
}
