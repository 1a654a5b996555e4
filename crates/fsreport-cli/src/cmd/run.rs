use crate::output::print_json;
use anyhow::Context;
use chrono::Local;
use clap::Args;
use fsreport_core::definition::{split_recipients, OptionOverrides};
use fsreport_core::mail::SendmailTransport;
use fsreport_core::paths;
use fsreport_core::pipeline::{self, DeliveryStatus, RunRequest};
use fsreport_core::types::OutputFormat;
use std::path::PathBuf;

#[derive(Args)]
pub struct RunArgs {
    /// Report definition file
    pub definition: PathBuf,

    /// Site configuration supplying the database connection when the
    /// definition carries none
    #[arg(long, env = "FSREPORT_SITE_CONFIG", default_value = paths::DEFAULT_SITE_CONFIG)]
    pub site_config: PathBuf,

    /// Directory receiving rendered report artifacts
    #[arg(long, env = "FSREPORT_REPORTS_DIR", default_value = paths::DEFAULT_REPORTS_DIR)]
    pub reports_dir: PathBuf,

    /// Directory receiving per-run audit logs
    #[arg(long, env = "FSREPORT_LOG_ROOT", default_value = paths::DEFAULT_LOG_ROOT)]
    pub log_root: PathBuf,

    /// Comma-separated recipients (overrides the definition)
    #[arg(long)]
    pub to: Option<String>,

    /// Output format (overrides the definition)
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// CSV delimiter (overrides the definition)
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Fail when the resolved query still contains placeholders
    #[arg(long)]
    pub strict_vars: bool,

    /// Write values verbatim, without CSV quoting or HTML escaping
    #[arg(long)]
    pub legacy_escaping: bool,

    /// sendmail-compatible command used for delivery
    #[arg(long, env = "FSREPORT_SENDMAIL", default_value = "/usr/sbin/sendmail")]
    pub sendmail: PathBuf,

    /// Skip delivery even when the definition configures recipients
    #[arg(long)]
    pub no_mail: bool,
}

pub fn run(args: RunArgs, json: bool) -> anyhow::Result<()> {
    let overrides = OptionOverrides {
        format: args.format,
        delimiter: args.delimiter.clone(),
        to: if args.no_mail {
            Some(Vec::new())
        } else {
            args.to.as_deref().map(split_recipients)
        },
        strict_vars: args.strict_vars,
        legacy_escaping: args.legacy_escaping,
    };

    let request = RunRequest {
        definition: &args.definition,
        site_config: &args.site_config,
        reports_dir: args.reports_dir.clone(),
        log_root: args.log_root.clone(),
        overrides,
        started_at: Local::now(),
    };
    let transport = SendmailTransport::new(&args.sendmail);

    let outcome = pipeline::run(&request, &transport)
        .with_context(|| format!("report run failed for {}", args.definition.display()))?;

    if json {
        return print_json(&outcome);
    }

    println!("Report generated: {}", outcome.artifact.display());
    match &outcome.delivery {
        DeliveryStatus::NotRequested => {}
        DeliveryStatus::Delivered { recipients } => {
            println!("Delivered to {}", recipients.join(", "));
        }
        DeliveryStatus::Failed { reason } => {
            eprintln!("warning: delivery failed: {reason}");
        }
    }
    println!("Audit log: {}", outcome.log.display());
    Ok(())
}
