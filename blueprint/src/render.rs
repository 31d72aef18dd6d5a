use std::collections::BTreeMap;

use once_cell::sync::OnceCell;
use regex_lite::Captures;
use regex_lite::Regex;

use crate::error::BlueprintError;
use crate::types::Placeholder;

fn placeholder_site_pattern() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").expect("valid placeholder regex"))
}

/// Replace every `{{name}}` site with its resolved value. Names are trimmed
/// before lookup, and unknown names render as the empty string by contract:
/// rendering is lenient, [`resolve_variables`] is where strictness lives.
pub fn render_template(text: &str, variables: &BTreeMap<String, String>) -> String {
    placeholder_site_pattern()
        .replace_all(text, |caps: &Captures<'_>| {
            let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            variables.get(name).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Resolve the declared placeholders against caller-supplied variables.
///
/// Per placeholder, in precedence order: a supplied non-empty value, then
/// the declared default, then the empty string for explicitly optional
/// sites. A required placeholder with none of those fails, naming itself.
/// Undeclared caller variables pass through so templates can reference them,
/// but they never overwrite a declared resolution.
pub fn resolve_variables(
    placeholders: &[Placeholder],
    provided: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, BlueprintError> {
    let mut resolved = BTreeMap::new();
    for placeholder in placeholders {
        let supplied = provided
            .get(&placeholder.name)
            .filter(|value| !value.is_empty());
        let value = if let Some(value) = supplied {
            value.clone()
        } else if let Some(default) = &placeholder.default {
            default.clone()
        } else if !placeholder.is_required() {
            String::new()
        } else {
            return Err(BlueprintError::MissingPlaceholder {
                name: placeholder.name.clone(),
            });
        };
        resolved.insert(placeholder.name.clone(), value);
    }
    for (key, value) in provided {
        resolved
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }
    Ok(resolved)
}
