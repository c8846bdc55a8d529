//! JSONL file writer for execution events.
//!
//! Every [`ExecutionEvent`] becomes one JSON object on its own line, stamped
//! with `type`, an RFC 3339 `timestamp` and the `run` id of the process that
//! wrote it. The file is opened in append mode, so the `run` field is what
//! separates transcripts of successive invocations.

use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use workforce_application::ports::execution_logger::{ExecutionEvent, ExecutionLogger};

/// Appending JSONL transcript of plan executions.
///
/// Concurrent nodes log through one `Mutex<BufWriter<File>>`, so lines never
/// interleave. Each event is flushed as it is written.
pub struct JsonlExecutionLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    run_id: String,
}

impl JsonlExecutionLogger {
    /// Open `path` for appending, creating parent directories as needed.
    ///
    /// Returns `None` (after a warning) when the file cannot be opened; the
    /// caller then falls back to no transcript.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(logger) => Some(logger),
            Err(e) => {
                warn!("Event log {} unavailable: {}", path.display(), e);
                None
            }
        }
    }

    fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            run_id: format!("{:x}", chrono::Utc::now().timestamp_micros()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identifier stamped on every line this logger writes
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn record(&self, event: ExecutionEvent) -> Value {
        let mut fields = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".into(), other);
                map
            }
        };
        fields.insert("type".into(), Value::from(event.event_type));
        fields.insert(
            "timestamp".into(),
            Value::from(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        );
        fields.insert("run".into(), Value::from(self.run_id.as_str()));
        Value::Object(fields)
    }
}

impl ExecutionLogger for JsonlExecutionLogger {
    fn log(&self, event: ExecutionEvent) {
        let record = self.record(event);
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if serde_json::to_writer(&mut *writer, &record).is_ok() {
            let _ = writer.write_all(b"\n");
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlExecutionLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
