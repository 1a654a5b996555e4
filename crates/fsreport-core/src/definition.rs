use crate::error::{ReportError, Result};
use crate::types::{EscapingMode, OutputFormat, PlaceholderMode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConnectionConfig / SiteConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub uri: String,
}

/// Operator-controlled file supplying the database connection when the
/// report definition carries none.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub database: ConnectionConfig,
}

impl SiteConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = read_source(path)?;
        serde_yaml::from_str(&data).map_err(|e| ReportError::ConfigRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// ReportDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct SqlQuerySection {
    query: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawDefinition {
    connection: Option<ConnectionConfig>,
    reportoptions: Option<BTreeMap<String, String>>,
    sqlquery: Option<SqlQuerySection>,
    queryvars: Option<BTreeMap<String, String>>,
}

/// One report's external definition: a SQL template, its substitution
/// variables, and rendering options. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ReportDefinition {
    pub name: String,
    pub connection: Option<ConnectionConfig>,
    pub options: BTreeMap<String, String>,
    pub variables: BTreeMap<String, String>,
    sql_template: String,
}

impl ReportDefinition {
    /// Load a definition from a YAML document with sections `connection`
    /// (optional), `reportoptions`, `sqlquery.query`, and `queryvars`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = read_source(path)?;
        Self::parse(&data, path)
    }

    fn parse(data: &str, path: &Path) -> Result<Self> {
        let raw: RawDefinition =
            serde_yaml::from_str(data).map_err(|e| ReportError::ConfigRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let missing = |section: &str| ReportError::MissingSection {
            path: path.display().to_string(),
            section: section.to_string(),
        };
        let sql_template = raw
            .sqlquery
            .ok_or_else(|| missing("sqlquery"))?
            .query
            .ok_or_else(|| missing("sqlquery.query"))?;

        Ok(ReportDefinition {
            name: crate::paths::report_name(path),
            connection: raw.connection,
            options: raw.reportoptions.unwrap_or_default(),
            variables: raw.queryvars.unwrap_or_default(),
            sql_template,
        })
    }

    pub fn sql_template(&self) -> &str {
        &self.sql_template
    }

    pub fn connection_uri(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.uri.as_str())
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ReportError::ConfigRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// RenderOptions
// ---------------------------------------------------------------------------

/// Effective rendering options for one run, constructed once from the
/// overlay: built-in defaults < definition `reportoptions` < CLI flags.
/// Unrecognized option keys are retained in `extra` but unused.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub delimiter: String,
    pub subject: String,
    pub from: String,
    pub to: Vec<String>,
    pub escaping: EscapingMode,
    pub placeholders: PlaceholderMode,
    pub extra: BTreeMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Html,
            delimiter: ",".to_string(),
            subject: String::new(),
            from: "root".to_string(),
            to: Vec::new(),
            escaping: EscapingMode::Standard,
            placeholders: PlaceholderMode::Lenient,
            extra: BTreeMap::new(),
        }
    }
}

/// Per-run command-line overrides. `to: Some(vec![])` clears recipients.
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub format: Option<OutputFormat>,
    pub delimiter: Option<String>,
    pub to: Option<Vec<String>>,
    pub strict_vars: bool,
    pub legacy_escaping: bool,
}

impl RenderOptions {
    pub fn resolve(
        definition: &BTreeMap<String, String>,
        overrides: &OptionOverrides,
    ) -> Result<Self> {
        let mut opts = RenderOptions::default();

        for (key, value) in definition {
            match key.as_str() {
                "format" => opts.format = value.parse()?,
                "delimiter" => opts.delimiter = value.clone(),
                "subject" => opts.subject = value.clone(),
                "from" => opts.from = value.clone(),
                "to" => opts.to = split_recipients(value),
                "escaping" => opts.escaping = value.parse()?,
                "placeholders" => opts.placeholders = value.parse()?,
                _ => {
                    opts.extra.insert(key.clone(), value.clone());
                }
            }
        }

        if let Some(format) = overrides.format {
            opts.format = format;
        }
        if let Some(delimiter) = &overrides.delimiter {
            opts.delimiter = delimiter.clone();
        }
        if let Some(to) = &overrides.to {
            opts.to = to.clone();
        }
        if overrides.strict_vars {
            opts.placeholders = PlaceholderMode::Strict;
        }
        if overrides.legacy_escaping {
            opts.escaping = EscapingMode::Legacy;
        }

        Ok(opts)
    }

    /// Key/value view of the effective options, for the audit log.
    pub fn describe(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("format".to_string(), self.format.to_string()),
            ("delimiter".to_string(), self.delimiter.clone()),
            ("subject".to_string(), self.subject.clone()),
            ("from".to_string(), self.from.clone()),
            ("to".to_string(), self.to.join(",")),
            ("escaping".to_string(), self.escaping.to_string()),
            ("placeholders".to_string(), self.placeholders.to_string()),
        ];
        for (k, v) in &self.extra {
            out.push((k.clone(), v.clone()));
        }
        out
    }
}

pub fn split_recipients(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
