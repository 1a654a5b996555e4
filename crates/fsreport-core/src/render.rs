//! Rendering of captured result sets into CSV or HTML artifacts.
//!
//! Rendering is deterministic: the same result set and options always
//! produce the same bytes. Artifacts are written atomically so a failed
//! render never leaves a partial file on disk.

use crate::definition::RenderOptions;
use crate::error::{ReportError, Result};
use crate::executor::ResultSet;
use crate::io;
use crate::types::{EscapingMode, OutputFormat};
use std::path::{Path, PathBuf};

/// Branding header emitted at the top of HTML reports.
const LOGO_TAG: &str =
    "<img src=\"logo.png\" alt=\"fsreport\" id=\"logo\" height=\"22\" width=\"88\">";

// ---------------------------------------------------------------------------
// ReportArtifact
// ---------------------------------------------------------------------------

/// A rendered report file on disk.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub bytes: u64,
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

pub fn render(
    result: &ResultSet,
    options: &RenderOptions,
    dest: &Path,
) -> Result<ReportArtifact> {
    let body = render_to_string(result, options);
    io::atomic_write(dest, body.as_bytes())
        .map_err(|e| ReportError::RenderWrite(e.to_string()))?;
    Ok(ReportArtifact {
        path: dest.to_path_buf(),
        format: options.format,
        bytes: body.len() as u64,
    })
}

/// Render without touching the filesystem. Used by `render` and by the
/// delivery stage to build the mail body.
pub fn render_to_string(result: &ResultSet, options: &RenderOptions) -> String {
    match options.format {
        OutputFormat::Csv => render_csv(result, &options.delimiter, options.escaping),
        OutputFormat::Html => render_html(result, &options.subject, options.escaping),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn render_csv(result: &ResultSet, delimiter: &str, escaping: EscapingMode) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, result.columns.iter().map(String::as_str), delimiter, escaping);
    for row in &result.rows {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        push_csv_line(&mut out, cells.iter().map(String::as_str), delimiter, escaping);
    }
    out
}

fn push_csv_line<'a>(
    out: &mut String,
    fields: impl Iterator<Item = &'a str>,
    delimiter: &str,
    escaping: EscapingMode,
) {
    let escaped: Vec<String> = fields.map(|f| csv_field(f, delimiter, escaping)).collect();
    out.push_str(&escaped.join(delimiter));
    out.push('\n');
}

fn csv_field(value: &str, delimiter: &str, escaping: EscapingMode) -> String {
    match escaping {
        EscapingMode::Legacy => value.to_string(),
        EscapingMode::Standard => {
            if value.contains(delimiter) || value.contains('"') || value.contains('\n') {
                format!("\"{}\"", value.replace('"', "\"\""))
            } else {
                value.to_string()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

fn render_html(result: &ResultSet, subject: &str, escaping: EscapingMode) -> String {
    let esc = |s: &str| match escaping {
        EscapingMode::Legacy => s.to_string(),
        EscapingMode::Standard => html_escape(s),
    };

    let mut out = String::new();
    out.push('\n');
    out.push_str(LOGO_TAG);
    out.push_str(&format!("\n<p></p><b>{}</b><p></p>", esc(subject)));
    out.push_str("\n<table border=\"1\">");
    out.push_str("\n  <tr>");
    for column in &result.columns {
        out.push_str(&format!("\n    <th align=\"center\">{}</th>", esc(column)));
    }
    out.push_str("\n  </tr>");
    for row in &result.rows {
        out.push_str("\n  <tr valign=\"top\">");
        for value in row {
            out.push_str(&format!(
                "\n    <td align=\"center\">{}</td>",
                esc(&value.to_string())
            ));
        }
        out.push_str("\n  </tr>");
    }
    out.push_str("\n</table>\n");
    out
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
