//! Run journal: one JSON line per completed forward or inverse run.
//!
//! Diagnostics go through `tracing`; the journal is the durable record of
//! which spectra were produced from which inputs and with which bounds.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::pipeline::{ForwardReport, InverseReport};

/// Output format for the diagnostic subscriber installed by binaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

fn append_json_line<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    serde_json::to_writer(&mut file, value)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    file.write_all(b"\n")
}

fn timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunLogEntry {
    pub operation: String,
    pub timestamp_ms: u128,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub height: usize,
    pub width: usize,
    pub mag_min: f64,
    pub mag_max: f64,
}

impl RunLogEntry {
    pub fn forward(report: &ForwardReport) -> Self {
        let mut outputs = vec![report.magnitude_key.clone(), report.phase_key.clone()];
        outputs.extend(report.metadata_key.clone());
        Self {
            operation: "forward".to_string(),
            timestamp_ms: timestamp_ms(),
            inputs: vec![report.input_key.clone()],
            outputs,
            height: report.height,
            width: report.width,
            mag_min: report.metadata.mag_min,
            mag_max: report.metadata.mag_max,
        }
    }

    pub fn inverse(report: &InverseReport) -> Self {
        Self {
            operation: "inverse".to_string(),
            timestamp_ms: timestamp_ms(),
            inputs: vec![report.magnitude_key.clone(), report.phase_key.clone()],
            outputs: vec![report.output_key.clone()],
            height: report.height,
            width: report.width,
            mag_min: report.metadata.mag_min,
            mag_max: report.metadata.mag_max,
        }
    }
}

/// Append-only JSONL file of [`RunLogEntry`] records.
#[derive(Debug, Clone)]
pub struct RunJournal {
    path: PathBuf,
}

impl RunJournal {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, entry: &RunLogEntry) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        append_json_line(&self.path, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecMetadata;
    use tempfile::tempdir;

    fn sample_report() -> ForwardReport {
        ForwardReport {
            input_key: "input/forest.png".to_string(),
            magnitude_key: "output/forest_magnitude.png".to_string(),
            phase_key: "output/forest_phase.png".to_string(),
            metadata_key: Some("output/forest_metadata.json".to_string()),
            height: 4,
            width: 4,
            metadata: CodecMetadata::new(0.0, 4.8),
        }
    }

    #[test]
    fn forward_entry_lists_all_outputs() {
        let entry = RunLogEntry::forward(&sample_report());
        assert_eq!(entry.operation, "forward");
        assert_eq!(entry.outputs.len(), 3);
        assert_eq!(entry.inputs, vec!["input/forest.png".to_string()]);
    }

    #[test]
    fn journal_appends_one_line_per_entry() {
        let dir = tempdir().unwrap();
        let journal = RunJournal::new(dir.path().join("logs/runs.jsonl"));
        let entry = RunLogEntry::forward(&sample_report());
        journal.record(&entry).unwrap();
        journal.record(&entry).unwrap();

        let contents = fs::read_to_string(journal.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: RunLogEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn log_format_parses_snake_case() {
        let format: LogFormat = serde_json::from_str("\"pretty\"").unwrap();
        assert_eq!(format, LogFormat::Pretty);
    }
}
