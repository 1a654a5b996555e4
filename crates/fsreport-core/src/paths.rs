use crate::types::OutputFormat;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_SITE_CONFIG: &str = "/etc/fsreport/site.yaml";
pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_LOG_ROOT: &str = "log/fsreport";

/// Wall-clock stamp used for log lines, log filenames, and artifact
/// filenames. Second granularity: two runs of the same report started in
/// the same second collide, which is a documented limitation.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn run_stamp(started_at: DateTime<Local>) -> String {
    started_at.format(TIMESTAMP_FORMAT).to_string()
}

/// `<reports_dir>/<report>-<stamp>-report.<ext>`
pub fn artifact_path(
    reports_dir: &Path,
    report: &str,
    stamp: &str,
    format: OutputFormat,
) -> PathBuf {
    reports_dir.join(format!("{report}-{stamp}-report.{}", format.extension()))
}

/// `<log_root>/<report>-<stamp>.log`
pub fn log_path(log_root: &Path, report: &str, stamp: &str) -> PathBuf {
    log_root.join(format!("{report}-{stamp}.log"))
}

/// Report name derived from the definition file's base name.
pub fn report_name(definition: &Path) -> String {
    definition
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_path_shape() {
        let path = artifact_path(
            Path::new("/srv/reports"),
            "usage-by-volume",
            "20240301-120000",
            OutputFormat::Csv,
        );
        assert_eq!(
            path,
            PathBuf::from("/srv/reports/usage-by-volume-20240301-120000-report.csv")
        );
    }

    #[test]
    fn log_path_shape() {
        let path = log_path(Path::new("/var/log/fsreport"), "usage", "20240301-120000");
        assert_eq!(
            path,
            PathBuf::from("/var/log/fsreport/usage-20240301-120000.log")
        );
    }

    #[test]
    fn report_name_strips_extension() {
        assert_eq!(report_name(Path::new("defs/usage-by-volume.yaml")), "usage-by-volume");
        assert_eq!(report_name(Path::new("plain")), "plain");
    }

    #[test]
    fn distinct_stamps_give_distinct_paths() {
        let dir = Path::new("reports");
        let a = artifact_path(dir, "usage", "20240301-120000", OutputFormat::Html);
        let b = artifact_path(dir, "usage", "20240301-120001", OutputFormat::Html);
        assert_ne!(a, b);
    }
}
