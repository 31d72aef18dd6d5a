use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::SecondsFormat;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

/// One structured operation-log record, serialized as a single NDJSON line.
#[derive(Debug, Clone, Serialize)]
pub struct OpRecord {
    /// RFC3339 timestamp with millisecond precision.
    pub ts: String,
    pub level: &'static str,
    pub message: String,
    pub details: Value,
}

impl OpRecord {
    pub(crate) fn new(level: &'static str, message: &str, details: Value) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message: message.to_string(),
            details,
        }
    }
}

/// Best-effort NDJSON sink for operation records. Failures are swallowed:
/// the diagnostic channel must never fail the operation that fed it.
pub(crate) struct OpLog {
    path: PathBuf,
}

impl OpLog {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn append(&self, record: &OpRecord) {
        let Ok(line) = serde_json::to_string(record) else {
            return;
        };
        if let Some(parent) = self.path.parent()
            && std::fs::create_dir_all(parent).is_err()
        {
            return;
        }
        let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        else {
            return;
        };
        let _ = writeln!(file, "{line}");
    }
}
