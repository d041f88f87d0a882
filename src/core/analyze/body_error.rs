//! Error category analysis over exported body errors
//!
//! Errors are bucketed by the text before their first `:`. Variants of the
//! generic `error` bucket are merged case-insensitively. Each bucket is
//! counted overall and per day; daily submission totals, when present in the
//! stream, turn the per-day counts into ratios.

use super::Analyzer;
use crate::domain::{BodyError, DailyTotal, LoglensError, Record, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write;
use std::path::Path;

/// Header of the first column in the per-day reports
pub const DEFAULT_GROUP_LABEL: &str = "error type/datetime";

const GENERIC_BUCKET: &str = "error";

/// Reduces a raw error text to its category
///
/// Surrounding quotes are stripped and everything from the first `:` on is
/// dropped. Any casing of `error` maps to `error`. Applying it twice gives
/// the same result as applying it once.
pub fn normalize_error(raw: &str) -> String {
    let prefix = raw
        .trim_matches('"')
        .split(':')
        .next()
        .unwrap_or_default();
    if prefix.eq_ignore_ascii_case(GENERIC_BUCKET) {
        GENERIC_BUCKET.to_string()
    } else {
        prefix.to_string()
    }
}

/// Date part of a timestamp such as `2023-09-22T17:53:44.362Z`
pub fn extract_date(raw: &str) -> String {
    raw.trim_matches('"')
        .split('T')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// `count / total` rounded to two decimals, or 0 when either side is 0
///
/// Rounding is to the nearest hundredth of the exact `f64` ratio, with exact
/// ties going to the even neighbour (`1/8` is `0.12`, `3/8` is `0.38`).
pub fn get_percent(count: u64, total: u64) -> f64 {
    if count == 0 || total == 0 {
        return 0.0;
    }
    let ratio = count as f64 / total as f64;
    let scaled = ratio * 100.0;
    let floor = scaled.floor();
    let rounded = if scaled - floor == 0.5 {
        // Error of the scaling product decides ties that are not exact
        let residual = ratio.mul_add(100.0, -scaled);
        if residual > 0.0 || (residual == 0.0 && floor % 2.0 != 0.0) {
            floor + 1.0
        } else {
            floor
        }
    } else {
        scaled.round()
    };
    rounded / 100.0
}

/// Percentage cell text: `0` when nothing can be computed, otherwise the
/// rounded ratio with whole numbers keeping their fractional digit (`1.0`)
pub fn format_percent(count: u64, total: u64) -> String {
    if count == 0 || total == 0 {
        return "0".to_string();
    }
    format!("{:?}", get_percent(count, total))
}

/// Buckets body errors by category and day
#[derive(Debug)]
pub struct BodyErrorAnalyzer {
    group_label: String,
    errors: HashMap<String, u64>,
    daily_counts: HashMap<String, BTreeMap<String, u64>>,
    dates: BTreeSet<String>,
    date_totals: BTreeMap<String, u64>,
    submit_totals: BTreeMap<String, u64>,
    ignored: u64,
}

impl Default for BodyErrorAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_LABEL)
    }
}

impl BodyErrorAnalyzer {
    /// Creates an analyzer whose per-day reports are headed by `group_label`
    pub fn new(group_label: impl Into<String>) -> Self {
        Self {
            group_label: group_label.into(),
            errors: HashMap::new(),
            daily_counts: HashMap::new(),
            dates: BTreeSet::new(),
            date_totals: BTreeMap::new(),
            submit_totals: BTreeMap::new(),
            ignored: 0,
        }
    }

    fn add_error(&mut self, row: &BodyError) {
        let attribute_error = normalize_error(&row.attribute_error);
        let error = if attribute_error.is_empty() {
            normalize_error(&row.body_message)
        } else {
            attribute_error
        };
        if error.is_empty() {
            self.ignored += 1;
            return;
        }

        let date = extract_date(&row.date);
        *self.errors.entry(error.clone()).or_insert(0) += 1;
        *self
            .daily_counts
            .entry(error)
            .or_default()
            .entry(date.clone())
            .or_insert(0) += 1;
        *self.date_totals.entry(date.clone()).or_insert(0) += 1;
        self.dates.insert(date);
    }

    fn add_total(&mut self, row: &DailyTotal) {
        self.submit_totals.insert(extract_date(&row.date), row.total);
    }
}

impl Analyzer for BodyErrorAnalyzer {
    type Report = BodyErrorReport;

    fn name(&self) -> &'static str {
        "body_errors"
    }

    fn analyze(&mut self, record: Record) -> Result<()> {
        match record {
            Record::BodyError(row) => self.add_error(&row),
            Record::DailyTotal(row) => self.add_total(&row),
            other => {
                return Err(LoglensError::InvalidRecordType {
                    analyzer: self.name(),
                    record_kind: other.kind(),
                })
            }
        }
        Ok(())
    }

    fn finalize(self) -> Result<BodyErrorReport> {
        let mut errors: Vec<(String, u64)> = self.errors.into_iter().collect();
        errors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        tracing::info!(
            categories = errors.len(),
            ignored = self.ignored,
            "Body error analysis complete"
        );
        for (date, total) in &self.date_totals {
            tracing::info!(date = %date, errors = total, "Daily error total");
        }

        Ok(BodyErrorReport {
            group_label: self.group_label,
            errors,
            dates: self.dates.into_iter().collect(),
            daily_counts: self.daily_counts,
            date_totals: self.date_totals,
            submit_totals: self.submit_totals,
        })
    }
}

/// Error categories of one run with their per-day breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct BodyErrorReport {
    group_label: String,
    errors: Vec<(String, u64)>,
    dates: Vec<String>,
    daily_counts: HashMap<String, BTreeMap<String, u64>>,
    date_totals: BTreeMap<String, u64>,
    submit_totals: BTreeMap<String, u64>,
}

impl BodyErrorReport {
    /// Categories with counts, most frequent first
    pub fn errors(&self) -> &[(String, u64)] {
        &self.errors
    }

    /// Days with at least one error, ascending
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Count of one category on one day
    pub fn daily_count(&self, error: &str, date: &str) -> Option<u64> {
        self.daily_counts.get(error)?.get(date).copied()
    }

    /// Errors of all categories per day
    pub fn date_totals(&self) -> &BTreeMap<String, u64> {
        &self.date_totals
    }

    /// Ratio of one category's count to the day's submissions
    pub fn daily_percentage(&self, error: &str, date: &str) -> Option<f64> {
        let count = self.daily_count(error, date)?;
        let total = self.submit_totals.get(date).copied().unwrap_or(0);
        Some(get_percent(count, total))
    }

    /// Number of categorized errors
    pub fn total(&self) -> u64 {
        self.errors.iter().map(|(_, count)| count).sum()
    }

    /// Writes the three report files
    pub fn write_files(
        &self,
        errors_path: impl AsRef<Path>,
        daily_counts_path: impl AsRef<Path>,
        daily_percentages_path: impl AsRef<Path>,
    ) -> Result<()> {
        self.write_error_counts(create(errors_path.as_ref())?)?;
        self.write_daily_counts(create(daily_counts_path.as_ref())?)?;
        self.write_daily_percentages(create(daily_percentages_path.as_ref())?)?;
        tracing::info!(
            errors = %errors_path.as_ref().display(),
            daily_counts = %daily_counts_path.as_ref().display(),
            daily_percentages = %daily_percentages_path.as_ref().display(),
            "Body error reports written"
        );
        Ok(())
    }

    /// `error,count`, most frequent first
    pub fn write_error_counts<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["error", "count"])?;
        for (error, count) in &self.errors {
            csv.write_record([error.clone(), count.to_string()])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// One row per category, one column per day, blank where zero
    pub fn write_daily_counts<W: Write>(&self, writer: W) -> Result<()> {
        self.write_daily(writer, |error, date| {
            self.daily_count(error, date).map(|c| c.to_string())
        })
    }

    /// Same layout as the daily counts, cells holding submission ratios
    pub fn write_daily_percentages<W: Write>(&self, writer: W) -> Result<()> {
        self.write_daily(writer, |error, date| {
            let count = self.daily_count(error, date)?;
            let total = self.submit_totals.get(date).copied().unwrap_or(0);
            Some(format_percent(count, total))
        })
    }

    fn write_daily<W, F>(&self, writer: W, cell: F) -> Result<()>
    where
        W: Write,
        F: Fn(&str, &str) -> Option<String>,
    {
        let mut csv = csv::Writer::from_writer(writer);
        let header: Vec<&str> = std::iter::once(self.group_label.as_str())
            .chain(self.dates.iter().map(String::as_str))
            .collect();
        csv.write_record(&header)?;

        for (error, _) in &self.errors {
            let row: Vec<String> = std::iter::once(error.clone())
                .chain(
                    self.dates
                        .iter()
                        .map(|date| cell(error, date).unwrap_or_default()),
                )
                .collect();
            csv.write_record(&row)?;
        }
        csv.flush()?;
        Ok(())
    }
}

fn create(path: &Path) -> Result<std::fs::File> {
    std::fs::File::create(path)
        .map_err(|e| LoglensError::Report(format!("Failed to create {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn analyze_all(rows: Vec<Record>) -> BodyErrorReport {
        let mut analyzer = BodyErrorAnalyzer::default();
        for row in rows {
            analyzer.analyze(row).unwrap();
        }
        analyzer.finalize().unwrap()
    }

    fn body_error(date: &str, attribute: &str, message: &str) -> Record {
        Record::BodyError(BodyError::new(date, attribute, message))
    }

    #[test_case("Error: foo", "error" ; "capitalized generic")]
    #[test_case("error: bar", "error" ; "lowercase generic")]
    #[test_case("ERROR", "error" ; "uppercase generic without detail")]
    #[test_case("CustomError:detail", "CustomError" ; "custom prefix")]
    #[test_case("\"Timeout: upstream\"", "Timeout" ; "quoted")]
    #[test_case("no delimiter here", "no delimiter here" ; "no delimiter")]
    #[test_case("", "" ; "empty")]
    fn test_normalize_error(raw: &str, expected: &str) {
        assert_eq!(normalize_error(raw), expected);
        assert_eq!(normalize_error(&normalize_error(raw)), expected);
    }

    #[test_case("2023-09-22T17:53:44.362Z", "2023-09-22" ; "timestamp")]
    #[test_case("\"2023-09-22T17:53:44.362Z\"", "2023-09-22" ; "quoted timestamp")]
    #[test_case("2023-09-22", "2023-09-22" ; "plain date")]
    #[test_case("", "" ; "empty")]
    fn test_extract_date(raw: &str, expected: &str) {
        assert_eq!(extract_date(raw), expected);
    }

    #[test_case(0, 100, 0.0 ; "zero count")]
    #[test_case(10, 0, 0.0 ; "zero total")]
    #[test_case(1, 3, 0.33 ; "one third")]
    #[test_case(2, 3, 0.67 ; "two thirds")]
    #[test_case(5, 5, 1.0 ; "all")]
    #[test_case(1, 8, 0.12 ; "half rounds down to even")]
    #[test_case(5, 8, 0.62 ; "five eighths rounds down to even")]
    #[test_case(3, 8, 0.38 ; "half rounds up to even")]
    #[test_case(1, 40, 0.03 ; "inexact tie follows the stored value")]
    #[test_case(1, 1000, 0.0 ; "below half a hundredth")]
    fn test_get_percent(count: u64, total: u64, expected: f64) {
        assert!((get_percent(count, total) - expected).abs() < f64::EPSILON);
    }

    #[test_case(0, 4, "0" ; "no errors")]
    #[test_case(3, 0, "0" ; "missing total")]
    #[test_case(4, 4, "1.0" ; "whole ratio keeps fraction")]
    #[test_case(1, 2, "0.5" ; "half")]
    #[test_case(1, 3, "0.33" ; "one third")]
    #[test_case(1, 1000, "0.0" ; "rounded to zero")]
    fn test_format_percent(count: u64, total: u64, expected: &str) {
        assert_eq!(format_percent(count, total), expected);
    }

    #[test]
    fn test_three_row_scenario() {
        let report = analyze_all(vec![
            body_error("2023-09-08T10:00:00.000Z", "Timeout: upstream", ""),
            body_error("2023-09-08T11:00:00.000Z", "Timeout: again", ""),
            body_error("2023-09-09T09:00:00.000Z", "", "Parse: bad input"),
        ]);

        assert_eq!(
            report.errors(),
            &[("Timeout".to_string(), 2), ("Parse".to_string(), 1)]
        );
        assert_eq!(report.dates(), &["2023-09-08", "2023-09-09"]);
        assert_eq!(report.daily_count("Timeout", "2023-09-08"), Some(2));
        assert_eq!(report.daily_count("Timeout", "2023-09-09"), None);
        assert_eq!(report.daily_count("Parse", "2023-09-09"), Some(1));

        let mut counts = Vec::new();
        report.write_daily_counts(&mut counts).unwrap();
        assert_eq!(
            String::from_utf8(counts).unwrap(),
            "error type/datetime,2023-09-08,2023-09-09\nTimeout,2,\nParse,,1\n"
        );
    }

    #[test]
    fn test_attribute_error_preferred_over_message() {
        let report = analyze_all(vec![body_error(
            "2023-09-08T00:00:00Z",
            "Quota: exceeded",
            "Other: ignored",
        )]);
        assert_eq!(report.errors(), &[("Quota".to_string(), 1)]);
    }

    #[test]
    fn test_total_equals_non_empty_errors() {
        let mut rows: Vec<Record> = (0..40)
            .map(|i| {
                body_error(
                    &format!("2023-09-{:02}T00:00:00Z", 1 + i % 5),
                    &format!("E{}: detail", i % 3),
                    "",
                )
            })
            .collect();
        rows.push(body_error("2023-09-01T00:00:00Z", "", ""));
        rows.push(body_error("2023-09-01T00:00:00Z", "\"\"", ""));

        let report = analyze_all(rows);

        assert_eq!(report.total(), 40);
        assert_eq!(report.date_totals().values().sum::<u64>(), 40);
    }

    #[test]
    fn test_percentages_use_daily_totals() {
        let report = analyze_all(vec![
            Record::DailyTotal(DailyTotal::new("2023-09-08", 3)),
            body_error("2023-09-08T10:00:00Z", "Timeout: x", ""),
            body_error("2023-09-09T10:00:00Z", "Timeout: y", ""),
        ]);

        assert_eq!(report.daily_percentage("Timeout", "2023-09-08"), Some(0.33));
        assert_eq!(report.daily_percentage("Timeout", "2023-09-09"), Some(0.0));

        let mut out = Vec::new();
        report.write_daily_percentages(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "error type/datetime,2023-09-08,2023-09-09\nTimeout,0.33,0\n"
        );
    }

    #[test]
    fn test_percentages_csv_keeps_whole_and_half_values() {
        let report = analyze_all(vec![
            Record::DailyTotal(DailyTotal::new("2023-09-08", 1)),
            Record::DailyTotal(DailyTotal::new("2023-09-09", 8)),
            body_error("2023-09-08T10:00:00Z", "Timeout: x", ""),
            body_error("2023-09-09T10:00:00Z", "Timeout: y", ""),
        ]);

        let mut out = Vec::new();
        report.write_daily_percentages(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "error type/datetime,2023-09-08,2023-09-09\nTimeout,1.0,0.12\n"
        );
    }

    #[test]
    fn test_error_counts_csv() {
        let report = analyze_all(vec![
            body_error("2023-09-08T10:00:00Z", "B: x", ""),
            body_error("2023-09-08T10:00:00Z", "A: x", ""),
            body_error("2023-09-08T10:00:00Z", "B: y", ""),
        ]);

        let mut out = Vec::new();
        report.write_error_counts(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "error,count\nB,2\nA,1\n");
    }

    #[test]
    fn test_rejects_search_events() {
        let mut analyzer = BodyErrorAnalyzer::default();
        let err = analyzer
            .analyze(Record::Event(serde_json::json!({})))
            .unwrap_err();
        assert!(matches!(err, LoglensError::InvalidRecordType { .. }));
    }
}
