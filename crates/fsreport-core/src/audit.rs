use crate::error::{ReportError, Result};
use crate::io;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Append-only per-run audit log. Opening the log is fatal on failure:
/// no report runs without an audit trail. Appending is best-effort, so a
/// failure to write a log line can never mask the pipeline's real
/// failure.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Create the log root and the per-run log file.
    pub fn open(log_root: &Path, report: &str, stamp: &str) -> Result<AuditLog> {
        io::ensure_dir(log_root).map_err(|e| {
            ReportError::AuditLog(format!(
                "cannot create log root {}: {e}",
                log_root.display()
            ))
        })?;
        let path = crate::paths::log_path(log_root, report, stamp);
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                ReportError::AuditLog(format!("cannot create log file {}: {e}", path.display()))
            })?;
        Ok(AuditLog { path })
    }

    /// Write the standard run header: banner, start time, and the
    /// invocation parameters one per line.
    pub fn header(&self, stamp: &str, params: &[(String, String)]) {
        self.append(&"*".repeat(40));
        self.append(&format!("Run initiated at {stamp}"));
        self.append("Run parameters:");
        for (key, value) in params {
            self.append(&format!("    {key}: {value}"));
        }
    }

    /// Append one timestamped line and mirror it to the tracing layer.
    pub fn append(&self, message: &str) {
        tracing::info!("{message}");
        let ts = Local::now().format(crate::paths::TIMESTAMP_FORMAT);
        let line = format!("{ts}:  {message}\n");
        let _ = io::append_text(&self.path, &line);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
