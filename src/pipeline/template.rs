//! `{{ name }}` placeholder resolution for step parameters.
//!
//! Placeholders are scanned in a single regex pass per string; whitespace
//! around the name is ignored. A name with no matching variable substitutes
//! the empty string — a deliberate, non-failing policy so a pipeline can
//! reference optional inputs without guards. Non-string parameter values
//! pass through untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

static RE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*([^}]+?)\s*\}\}").unwrap());

/// Render a variable as replacement text.
///
/// Strings substitute verbatim; numbers and booleans via their display
/// form; `null` and missing names as empty; arrays and objects as compact
/// JSON so a path list survives a template round-trip deterministically.
fn render(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Substitute every placeholder in `text` from `vars`.
pub fn resolve_str(text: &str, vars: &BTreeMap<String, Value>) -> String {
    RE_PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures<'_>| render(vars.get(&caps[1])))
        .into_owned()
}

/// Resolve a step's parameter map against the current variables.
///
/// Returns a new map; `vars` is never touched, so nothing is observable
/// unless the step later succeeds.
pub fn resolve_params(
    params: &BTreeMap<String, Value>,
    vars: &BTreeMap<String, Value>,
) -> BTreeMap<String, Value> {
    params
        .iter()
        .map(|(key, value)| {
            let resolved = match value {
                Value::String(s) => Value::String(resolve_str(s, vars)),
                other => other.clone(),
            };
            (key.clone(), resolved)
        })
        .collect()
}
