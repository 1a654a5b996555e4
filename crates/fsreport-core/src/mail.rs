//! Mail transport seam.
//!
//! The pipeline hands a fully formed message to a [`MailTransport`]; the
//! default implementation pipes it to a local sendmail-compatible command.
//! No retries, no bounce handling. Delivery is a best-effort notification
//! layer on top of the durable artifact.

use crate::error::{ReportError, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

// ---------------------------------------------------------------------------
// MailMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub subject: String,
    pub from: String,
    pub to: Vec<String>,
    pub content_type: String,
    pub body: String,
}

impl MailMessage {
    /// RFC 822-style rendering: headers, blank line, body.
    pub fn to_rfc822(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("From: {}\n", self.from));
        out.push_str(&format!("To: {}\n", self.to.join(", ")));
        out.push_str(&format!("Subject: {}\n", self.subject));
        out.push_str("MIME-Version: 1.0\n");
        out.push_str(&format!("Content-Type: {}\n", self.content_type));
        out.push('\n');
        out.push_str(&self.body);
        out
    }
}

// ---------------------------------------------------------------------------
// MailTransport
// ---------------------------------------------------------------------------

pub trait MailTransport {
    fn deliver(&self, message: &MailMessage) -> Result<()>;
}

/// Pipes the formatted message to a sendmail-compatible command.
/// `-t` takes the recipients from the message headers; `-i` keeps a lone
/// dot on a line from terminating the body.
pub struct SendmailTransport {
    command: PathBuf,
}

impl SendmailTransport {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for SendmailTransport {
    fn default() -> Self {
        Self::new("/usr/sbin/sendmail")
    }
}

impl MailTransport for SendmailTransport {
    fn deliver(&self, message: &MailMessage) -> Result<()> {
        let mut child = Command::new(&self.command)
            .args(["-i", "-t"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReportError::Delivery(format!("cannot spawn {}: {e}", self.command.display()))
            })?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(message.to_rfc822().as_bytes())
                .map_err(|e| ReportError::Delivery(format!("failed to write message: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ReportError::Delivery(e.to_string()))?;

        if !output.status.success() {
            let hint = String::from_utf8_lossy(&output.stderr);
            return Err(ReportError::Delivery(format!(
                "{} exited with {}: {}",
                self.command.display(),
                output.status,
                hint.trim()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc822_shape() {
        let message = MailMessage {
            subject: "Usage by volume".to_string(),
            from: "root".to_string(),
            to: vec!["ops@example.com".to_string(), "storage@example.com".to_string()],
            content_type: "text/html".to_string(),
            body: "<table></table>".to_string(),
        };
        let rendered = message.to_rfc822();
        assert!(rendered.starts_with("From: root\n"));
        assert!(rendered.contains("To: ops@example.com, storage@example.com\n"));
        assert!(rendered.contains("Subject: Usage by volume\n"));
        assert!(rendered.contains("Content-Type: text/html\n"));
        assert!(rendered.ends_with("\n\n<table></table>"));
    }

    #[test]
    fn missing_command_is_delivery_error() {
        let transport = SendmailTransport::new("/nonexistent/sendmail");
        let message = MailMessage {
            subject: String::new(),
            from: "root".to_string(),
            to: vec!["ops@example.com".to_string()],
            content_type: "text/plain".to_string(),
            body: String::new(),
        };
        let err = transport.deliver(&message).unwrap_err();
        assert!(matches!(err, ReportError::Delivery(_)));
    }

    #[cfg(unix)]
    fn fake_sendmail(dir: &tempfile::TempDir, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.path().join("sendmail");
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn delivers_through_stdin_draining_command() {
        let dir = tempfile::TempDir::new().unwrap();
        let transport = SendmailTransport::new(fake_sendmail(&dir, "cat > /dev/null"));
        let message = MailMessage {
            subject: "s".to_string(),
            from: "root".to_string(),
            to: vec!["ops@example.com".to_string()],
            content_type: "text/plain".to_string(),
            body: "body".to_string(),
        };
        transport.deliver(&message).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_delivery_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let transport =
            SendmailTransport::new(fake_sendmail(&dir, "cat > /dev/null; echo refused >&2; exit 1"));
        let message = MailMessage {
            subject: "s".to_string(),
            from: "root".to_string(),
            to: vec!["ops@example.com".to_string()],
            content_type: "text/plain".to_string(),
            body: "body".to_string(),
        };
        let err = transport.deliver(&message).unwrap_err();
        assert!(err.to_string().contains("refused"));
    }
}
