//! Variable interpolation for SQL templates.
//!
//! Placeholders are `{{name}}` tokens. Substitution is a single
//! left-to-right scan: substituted text is never re-scanned, so a variable
//! value containing `{{other}}` cannot trigger a second round of
//! substitution. Placeholders with no matching variable are left verbatim
//! in lenient mode; strict mode turns them into an error before the query
//! reaches the database.

use crate::error::{ReportError, Result};
use crate::types::PlaceholderMode;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE
        .get_or_init(|| Regex::new(r"\{\{([A-Za-z0-9_][A-Za-z0-9_.\-]*)\}\}").unwrap())
}

/// Replace every `{{name}}` occurrence for `name ∈ variables` with the
/// variable's literal value, case-sensitively. Unknown placeholders are
/// left in place.
pub fn resolve(template: &str, variables: &BTreeMap<String, String>) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Placeholder names still present in `text`, sorted and deduplicated.
pub fn unresolved(text: &str) -> Vec<String> {
    let mut names: Vec<String> = placeholder_re()
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Resolve the template, then enforce the placeholder mode.
pub fn resolve_checked(
    template: &str,
    variables: &BTreeMap<String, String>,
    mode: PlaceholderMode,
) -> Result<String> {
    let resolved = resolve(template, variables);
    if mode == PlaceholderMode::Strict {
        let leftover = unresolved(&resolved);
        if !leftover.is_empty() {
            return Err(ReportError::TemplateVariable(leftover));
        }
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn identity_without_placeholders() {
        let template = "SELECT path, size FROM files WHERE size > 0";
        let resolved = resolve(template, &vars(&[("volume", "vol1")]));
        assert_eq!(resolved, template);
    }

    #[test]
    fn empty_variables_change_nothing() {
        let template = "SELECT * FROM files WHERE volume = '{{volume}}'";
        assert_eq!(resolve(template, &BTreeMap::new()), template);
    }

    #[test]
    fn replaces_every_occurrence() {
        let template = "SELECT '{{v}}' AS a, '{{v}}' AS b FROM t WHERE x = '{{v}}'";
        let resolved = resolve(template, &vars(&[("v", "vol1")]));
        assert_eq!(resolved, "SELECT 'vol1' AS a, 'vol1' AS b FROM t WHERE x = 'vol1'");
    }

    #[test]
    fn unknown_placeholders_left_verbatim() {
        let template = "WHERE volume = '{{volume}}' AND owner = '{{owner}}'";
        let resolved = resolve(template, &vars(&[("volume", "vol1")]));
        assert_eq!(resolved, "WHERE volume = 'vol1' AND owner = '{{owner}}'");
    }

    #[test]
    fn substitution_is_not_recursive() {
        // A value containing a placeholder token must not be expanded.
        let resolved = resolve(
            "SELECT {{a}}",
            &vars(&[("a", "{{b}}"), ("b", "boom")]),
        );
        assert_eq!(resolved, "SELECT {{b}}");
    }

    #[test]
    fn substitution_is_case_sensitive() {
        let template = "WHERE v = '{{Volume}}'";
        let resolved = resolve(template, &vars(&[("volume", "vol1")]));
        assert_eq!(resolved, template);
    }

    #[test]
    fn unresolved_lists_sorted_unique_names() {
        let names = unresolved("{{b}} {{a}} {{b}}");
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn strict_mode_fails_on_leftovers() {
        let err = resolve_checked(
            "WHERE v = '{{volume}}'",
            &BTreeMap::new(),
            PlaceholderMode::Strict,
        )
        .unwrap_err();
        match err {
            ReportError::TemplateVariable(names) => assert_eq!(names, vec!["volume"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lenient_mode_passes_leftovers_through() {
        let resolved = resolve_checked(
            "WHERE v = '{{volume}}'",
            &BTreeMap::new(),
            PlaceholderMode::Lenient,
        )
        .unwrap();
        assert_eq!(resolved, "WHERE v = '{{volume}}'");
    }

    #[test]
    fn hyphenated_names_are_placeholders() {
        let resolved = resolve("{{start-date}}", &vars(&[("start-date", "2024-01-01")]));
        assert_eq!(resolved, "2024-01-01");
    }
}
