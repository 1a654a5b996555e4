//! The report pipeline: a strictly sequential state machine.
//!
//! `Start → ConfigLoaded → QueryResolved → QueryExecuted → Rendered →
//! (Delivered | Done)`. Every stage transition and every fatal error is
//! appended to the per-run audit log. Failures before `Rendered` abort the
//! run with a typed error; the single top-level runner (the CLI) decides
//! the process exit code. A delivery failure after a successful render is
//! downgraded to a warning; the artifact on disk is the durable result.
//!
//! No stage is retried. Artifact paths carry the run's start stamp, so a
//! failed later stage never corrupts a prior successful report.

use crate::audit::AuditLog;
use crate::definition::{OptionOverrides, RenderOptions, ReportDefinition, SiteConfig};
use crate::error::{ReportError, Result};
use crate::executor;
use crate::io;
use crate::mail::{MailMessage, MailTransport};
use crate::paths;
use crate::render;
use crate::template;
use crate::types::{OutputFormat, Stage};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// RunRequest
// ---------------------------------------------------------------------------

/// Everything one pipeline run needs, assembled by the caller.
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    pub definition: &'a Path,
    /// Consulted only when the definition carries no `connection` section.
    pub site_config: &'a Path,
    pub reports_dir: PathBuf,
    pub log_root: PathBuf,
    pub overrides: OptionOverrides,
    pub started_at: DateTime<Local>,
}

// ---------------------------------------------------------------------------
// RunOutcome / DeliveryStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    NotRequested,
    Delivered { recipients: Vec<String> },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub report: String,
    pub stage: Stage,
    pub artifact: PathBuf,
    pub format: OutputFormat,
    pub rows: usize,
    pub bytes: u64,
    pub delivery: DeliveryStatus,
    pub log: PathBuf,
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub fn run(request: &RunRequest<'_>, transport: &dyn MailTransport) -> Result<RunOutcome> {
    let report = paths::report_name(request.definition);
    let stamp = paths::run_stamp(request.started_at);

    // Stage Start: no report runs without an audit trail.
    let log = AuditLog::open(&request.log_root, &report, &stamp)?;
    log.header(
        &stamp,
        &[
            (
                "definition".to_string(),
                request.definition.display().to_string(),
            ),
            (
                "reports_dir".to_string(),
                request.reports_dir.display().to_string(),
            ),
            (
                "log_root".to_string(),
                request.log_root.display().to_string(),
            ),
        ],
    );

    match run_stages(request, transport, &log, &report, &stamp) {
        Ok(outcome) => {
            log.append("Pipeline complete");
            Ok(outcome)
        }
        Err(e) => {
            log.append(&format!("FATAL: {e}"));
            Err(e)
        }
    }
}

fn run_stages(
    request: &RunRequest<'_>,
    transport: &dyn MailTransport,
    log: &AuditLog,
    report: &str,
    stamp: &str,
) -> Result<RunOutcome> {
    // -- ConfigLoaded --
    let definition = ReportDefinition::load(request.definition)?;
    log.append("Report parameters read from definition:");
    for (key, value) in &definition.options {
        log.append(&format!("  {key}: {value}"));
    }
    let options = RenderOptions::resolve(&definition.options, &request.overrides)?;
    log.append("Effective report parameters:");
    for (key, value) in options.describe() {
        log.append(&format!("  {key}: {value}"));
    }
    advance(log, Stage::ConfigLoaded);

    // -- QueryResolved --
    let sql = template::resolve_checked(
        definition.sql_template(),
        &definition.variables,
        options.placeholders,
    )?;
    log.append("SQL query resolved");
    advance(log, Stage::QueryResolved);

    // -- QueryExecuted --
    let uri = match definition.connection_uri() {
        Some(uri) => uri.to_string(),
        None => SiteConfig::load(request.site_config)?.database.uri,
    };
    let conn = executor::connect(&uri)?;
    log.append("Connected to database");
    log.append("Executing SQL query");
    let result = executor::execute(&conn, &sql)?;
    log.append(&format!("Query returned {} rows", result.row_count()));
    advance(log, Stage::QueryExecuted);

    // -- Rendered --
    io::ensure_dir(&request.reports_dir)
        .map_err(|e| ReportError::RenderWrite(format!("cannot create reports directory: {e}")))?;
    let dest = paths::artifact_path(&request.reports_dir, report, stamp, options.format);
    let artifact = render::render(&result, &options, &dest)?;
    log.append(&format!("Report generated: {}", dest.display()));
    advance(log, Stage::Rendered);

    // -- Delivered | Done --
    let (stage, delivery) = if options.to.is_empty() {
        (Stage::Done, DeliveryStatus::NotRequested)
    } else {
        let message = MailMessage {
            subject: options.subject.clone(),
            from: options.from.clone(),
            to: options.to.clone(),
            content_type: options.format.content_type().to_string(),
            body: render::render_to_string(&result, &options),
        };
        match transport.deliver(&message) {
            Ok(()) => {
                log.append(&format!("Report delivered to {}", options.to.join(", ")));
                advance(log, Stage::Delivered);
                (
                    Stage::Delivered,
                    DeliveryStatus::Delivered {
                        recipients: options.to.clone(),
                    },
                )
            }
            Err(e) => {
                // Non-fatal: the artifact on disk is the durable result.
                log.append(&format!("WARNING: {e}"));
                tracing::warn!("delivery failed for {report}: {e}");
                (
                    Stage::Done,
                    DeliveryStatus::Failed {
                        reason: e.to_string(),
                    },
                )
            }
        }
    };

    Ok(RunOutcome {
        report: report.to_string(),
        stage,
        artifact: artifact.path,
        format: artifact.format,
        rows: result.row_count(),
        bytes: artifact.bytes,
        delivery,
        log: log.path().to_path_buf(),
    })
}

fn advance(log: &AuditLog, stage: Stage) {
    log.append(&format!("Stage complete: {stage}"));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
