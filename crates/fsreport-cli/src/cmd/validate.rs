use crate::output::print_json;
use anyhow::Context;
use fsreport_core::definition::{OptionOverrides, RenderOptions, ReportDefinition};
use fsreport_core::template;
use fsreport_core::types::PlaceholderMode;
use std::path::Path;

/// Dry-run a definition: load it, resolve the query, and report unresolved
/// placeholders and effective options without touching the database.
pub fn run(definition_path: &Path, strict_vars: bool, json: bool) -> anyhow::Result<()> {
    let definition = ReportDefinition::load(definition_path)
        .with_context(|| format!("cannot load {}", definition_path.display()))?;
    let overrides = OptionOverrides {
        strict_vars,
        ..Default::default()
    };
    let options = RenderOptions::resolve(&definition.options, &overrides)?;
    let sql = template::resolve(definition.sql_template(), &definition.variables);
    let unresolved = template::unresolved(&sql);

    if json {
        print_json(&serde_json::json!({
            "report": definition.name,
            "format": options.format,
            "recipients": options.to,
            "unresolved": unresolved,
            "query": sql,
        }))?;
    } else {
        println!("report: {}", definition.name);
        println!("format: {}", options.format);
        if !options.to.is_empty() {
            println!("recipients: {}", options.to.join(", "));
        }
        if unresolved.is_empty() {
            println!("query resolves cleanly");
        } else {
            println!("unresolved placeholders: {}", unresolved.join(", "));
        }
    }

    if options.placeholders == PlaceholderMode::Strict && !unresolved.is_empty() {
        anyhow::bail!("unresolved placeholders in query: {}", unresolved.join(", "));
    }
    Ok(())
}
