//! Append-only log of unexpected failures.
//!
//! Classified conditions (unsupported document, unsupported language, busy)
//! never reach this log. Engine failures, task panics and internal errors do,
//! with their full cause chain and, when captured, a backtrace.
//!
//! Writing the log must never turn into a second failure: [`ErrorLog::record`]
//! swallows write errors and reports them on stderr only.

use crate::errors::{describe, CheckError};
use crate::task::TaskError;
use chrono::Local;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ERROR_LOG_FILE_NAME: &str = "proofcheck.log";

#[derive(Debug, Error)]
pub enum ErrorLogError {
    #[error("failed to write error log {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Destination for unexpected-failure reports.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    path: Option<PathBuf>,
}

impl ErrorLog {
    /// Log to a specific file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Log to `proofcheck.log` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(ERROR_LOG_FILE_NAME))
    }

    /// The per-user location: the local data directory, else the temp dir.
    pub fn default_location() -> Self {
        let dir = dirs::data_local_dir()
            .map(|dir| dir.join("proofcheck"))
            .unwrap_or_else(std::env::temp_dir);
        Self::in_dir(dir)
    }

    /// Only emit tracing events; nothing is written to disk.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record an error, swallowing any failure to write the log.
    pub fn record(&self, err: &anyhow::Error) {
        self.record_entry(&**err, Some(err.backtrace()));
    }

    /// Record a check failure, digging out the underlying `anyhow` error
    /// when there is one so its backtrace is kept.
    pub fn record_check_error(&self, err: &CheckError) {
        match err {
            CheckError::Internal(inner) | CheckError::EngineFailure(TaskError::Failed(inner)) => {
                let entry = format_entry(err, Some(inner.backtrace()));
                self.write_or_report(err, &entry);
            }
            other => self.record_entry(other, None),
        }
    }

    fn record_entry(&self, err: &(dyn StdError + 'static), backtrace: Option<&Backtrace>) {
        let entry = format_entry(err, backtrace);
        self.write_or_report(err, &entry);
    }

    fn write_or_report(&self, err: &(dyn StdError + 'static), entry: &str) {
        tracing::error!(error = %describe(err), "Unexpected failure");
        if let Err(log_err) = self.try_append(entry) {
            log::warn!("Could not write error log: {}", log_err);
        }
    }

    /// Append a preformatted entry to the log file.
    pub fn try_append(&self, entry: &str) -> Result<(), ErrorLogError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let write_err = |source| ErrorLogError::Write {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(write_err)?;
        file.write_all(entry.as_bytes()).map_err(write_err)?;
        Ok(())
    }
}

fn format_entry(err: &(dyn StdError + 'static), backtrace: Option<&Backtrace>) -> String {
    let mut entry = format!(
        "[{}] {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f %z"),
        describe(err)
    );
    if let Some(bt) = backtrace.filter(|bt| bt.status() == BacktraceStatus::Captured) {
        entry.push_str("Backtrace:\n");
        entry.push_str(&bt.to_string());
        entry.push('\n');
    }
    entry.push_str("---\n");
    entry
}
