//! Session id analysis over remote search events
//!
//! Every event carrying request query params is counted by its `sid`. Two
//! device ids are tallied separately: the unexpanded `{PSID}` placeholder
//! and the literal `channel`.

use super::Analyzer;
use crate::domain::{LoglensError, Record, Result};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::Path;

const QUERY_PARAMS_POINTER: &str = "/event/json/req/queryParams";
const PSID_DEVICE: &str = "{PSID}";
const CHANNEL_DEVICE: &str = "channel";

/// Occurrence counts keyed by session id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTally {
    counts: HashMap<String, u64>,
}

impl SessionTally {
    fn add(&mut self, sid: &str) {
        *self.counts.entry(sid.to_string()).or_insert(0) += 1;
    }

    /// Occurrences of one session id
    pub fn get(&self, sid: &str) -> u64 {
        self.counts.get(sid).copied().unwrap_or(0)
    }

    /// Number of distinct session ids, the empty id included
    pub fn distinct_count(&self) -> usize {
        self.counts.len()
    }

    /// Distinct count plus every occurrence of the empty id
    pub fn count_including_empty(&self) -> u64 {
        self.counts.len() as u64 + self.get("")
    }

    /// Total occurrences across all ids
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Entries sorted by count descending, then id ascending
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

/// Counts distinct session ids seen in search events
#[derive(Debug, Default)]
pub struct SessionAnalyzer {
    all: SessionTally,
    psid: SessionTally,
    channel: SessionTally,
    skipped: u64,
}

impl SessionAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    fn analyze_event(&mut self, event: &Value) {
        let params = match event.pointer(QUERY_PARAMS_POINTER) {
            Some(Value::Object(params)) if !params.is_empty() => params,
            _ => {
                self.skipped += 1;
                return;
            }
        };

        let sid = params.get("sid").map(param_text).unwrap_or_default();
        let device_id = params.get("deviceId").map(param_text).unwrap_or_default();

        self.all.add(&sid);
        match device_id.as_str() {
            PSID_DEVICE => self.psid.add(&sid),
            CHANNEL_DEVICE => self.channel.add(&sid),
            _ => {}
        }
    }
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Analyzer for SessionAnalyzer {
    type Report = SessionReport;

    fn name(&self) -> &'static str {
        "sessions"
    }

    fn analyze(&mut self, record: Record) -> Result<()> {
        match record {
            Record::Event(event) => {
                self.analyze_event(&event);
                Ok(())
            }
            other => Err(LoglensError::InvalidRecordType {
                analyzer: self.name(),
                record_kind: other.kind(),
            }),
        }
    }

    fn finalize(self) -> Result<SessionReport> {
        let report = SessionReport {
            all: self.all,
            psid: self.psid,
            channel: self.channel,
            skipped: self.skipped,
        };
        report.log_summary();
        Ok(report)
    }
}

/// Session counts of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Every session id
    pub all: SessionTally,

    /// Session ids sent with the `{PSID}` device id
    pub psid: SessionTally,

    /// Session ids sent with the `channel` device id
    pub channel: SessionTally,

    /// Events without query params
    pub skipped: u64,
}

impl SessionReport {
    /// Labelled tallies in output order
    pub fn tallies(&self) -> [(&'static str, &SessionTally); 3] {
        [
            ("All sid", &self.all),
            ("deviceId=PSID", &self.psid),
            ("deviceId=channel", &self.channel),
        ]
    }

    pub fn log_summary(&self) {
        for (label, tally) in self.tallies() {
            tracing::info!(
                tally = label,
                items = tally.distinct_count(),
                including_empty = tally.count_including_empty(),
                occurrences = tally.total(),
                "Session tally"
            );
        }
        if self.skipped > 0 {
            tracing::debug!(skipped = self.skipped, "Events without query params skipped");
        }
    }

    /// Writes `sid,all,psid,channel` rows, busiest session first
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| {
            LoglensError::Report(format!("Failed to create {}: {e}", path.display()))
        })?;
        self.write_to(file)?;
        tracing::info!(path = %path.display(), "Session report written");
        Ok(())
    }

    /// Writes the session CSV to any writer
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["sid", "all", "psid", "channel"])?;

        let mut sids: Vec<_> = self
            .all
            .counts
            .keys()
            .chain(self.psid.counts.keys())
            .chain(self.channel.counts.keys())
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        sids.sort_by(|a, b| self.all.get(b).cmp(&self.all.get(a)).then_with(|| a.cmp(b)));

        for sid in sids {
            csv.write_record([
                sid.to_string(),
                self.all.get(sid).to_string(),
                self.psid.get(sid).to_string(),
                self.channel.get(sid).to_string(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }
}
