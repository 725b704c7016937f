//! Append-only usage log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use tracing::debug;

use crate::error::PersistenceFailure;
use crate::usage::UsageRecord;

/// Durable append-only store for usage records, one line per record.
///
/// Layout is a plain line stream with no header or index:
/// `<ISO-8601 timestamp>: in=<tokens_in>, out=<tokens_out>, cost=<cost>`.
/// Records accumulate indefinitely; pruning is an operational concern.
pub struct UsageLog {
    path: PathBuf,
}

impl UsageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single line.
    ///
    /// The file is opened in append mode (created if missing), the line is
    /// written with one write call and flushed before returning, and the
    /// handle is closed on every exit path. Open and write errors surface
    /// as [`PersistenceFailure`]; they are never swallowed.
    pub fn append(&self, record: &UsageRecord) -> Result<(), PersistenceFailure> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| PersistenceFailure::Open {
                path: self.path.clone(),
                source,
            })?;

        let line = Self::format_line(record);
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|source| PersistenceFailure::Write {
                path: self.path.clone(),
                source,
            })?;

        debug!("appended usage record to {:?}", self.path);
        Ok(())
    }

    /// Render one record as its log line, trailing newline included.
    fn format_line(record: &UsageRecord) -> String {
        format!(
            "{}: in={}, out={}, cost={}\n",
            record
                .captured_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            record.tokens_in,
            record.tokens_out,
            record.cost,
        )
    }
}
