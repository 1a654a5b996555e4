use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// OutputFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Csv,
    Html,
}

impl OutputFormat {
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Csv, OutputFormat::Html]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Html => "html",
        }
    }

    /// File extension of the rendered artifact.
    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// MIME type used when the artifact is mailed.
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Csv => "text/csv",
            OutputFormat::Html => "text/html",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = crate::error::ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(OutputFormat::Csv),
            "html" => Ok(OutputFormat::Html),
            _ => Err(crate::error::ReportError::UnsupportedFormat(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// EscapingMode
// ---------------------------------------------------------------------------

/// `Standard` quotes CSV fields and escapes HTML metacharacters. `Legacy`
/// writes every value verbatim, byte-compatible with reports produced
/// before escaping existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapingMode {
    Standard,
    Legacy,
}

impl EscapingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EscapingMode::Standard => "standard",
            EscapingMode::Legacy => "legacy",
        }
    }
}

impl fmt::Display for EscapingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EscapingMode {
    type Err = crate::error::ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(EscapingMode::Standard),
            "legacy" => Ok(EscapingMode::Legacy),
            _ => Err(crate::error::ReportError::InvalidOption {
                key: "escaping".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// PlaceholderMode
// ---------------------------------------------------------------------------

/// `Lenient` leaves unresolved `{{name}}` tokens in the query text for the
/// database to accept or reject. `Strict` fails the run before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderMode {
    Lenient,
    Strict,
}

impl PlaceholderMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaceholderMode::Lenient => "lenient",
            PlaceholderMode::Strict => "strict",
        }
    }
}

impl fmt::Display for PlaceholderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlaceholderMode {
    type Err = crate::error::ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lenient" => Ok(PlaceholderMode::Lenient),
            "strict" => Ok(PlaceholderMode::Strict),
            _ => Err(crate::error::ReportError::InvalidOption {
                key: "placeholders".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Pipeline progress marker. Stages are strictly sequential; any failure
/// before `Rendered` aborts the run. `Delivered` is only reached when
/// recipients are configured and the mail hand-off succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    ConfigLoaded,
    QueryResolved,
    QueryExecuted,
    Rendered,
    Delivered,
    Done,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[
            Stage::Start,
            Stage::ConfigLoaded,
            Stage::QueryResolved,
            Stage::QueryExecuted,
            Stage::Rendered,
            Stage::Delivered,
            Stage::Done,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Stage> {
        let all = Stage::all();
        let i = self.index();
        all.get(i + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::ConfigLoaded => "config_loaded",
            Stage::QueryResolved => "query_resolved",
            Stage::QueryExecuted => "query_executed",
            Stage::Rendered => "rendered",
            Stage::Delivered => "delivered",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
