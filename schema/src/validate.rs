use regex_lite::Regex;
use serde_json::Value;

use crate::document::AdditionalProperties;
use crate::document::SchemaDocument;

/// One violation: a JSON-pointer-style location plus a human-readable
/// message. `#` is the document root; children append `/{key}` for object
/// properties and `/{index}` for array elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub pointer: String,
    pub message: String,
}

impl Violation {
    fn new(pointer: &str, message: String) -> Self {
        Self {
            pointer: pointer.to_string(),
            message,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.pointer, self.message)
    }
}

/// Validate `value` against `schema`, accumulating every violation rather
/// than stopping at the first. An empty result means the document is valid.
pub fn validate_value(schema: &SchemaDocument, value: &Value) -> Vec<Violation> {
    let mut violations = Vec::new();
    walk(schema, value, "#", &mut violations);
    violations
}

fn walk(schema: &SchemaDocument, value: &Value, pointer: &str, out: &mut Vec<Violation>) {
    // A node of the wrong kind is reported once and not descended further;
    // per-field checks against a mistyped value would only produce noise.
    if let Some(kind) = schema.kind
        && !kind.matches(value)
    {
        out.push(Violation::new(
            pointer,
            format!("Expected type {}", kind.as_str()),
        ));
        return;
    }

    if let Some(allowed) = &schema.enum_values
        && !allowed.contains(value)
    {
        out.push(Violation::new(
            pointer,
            format!("Value {value} not in enum {}", Value::Array(allowed.clone())),
        ));
    }

    if let Value::String(text) = value {
        if let Some(min) = schema.min_length
            && text.chars().count() < min
        {
            out.push(Violation::new(
                pointer,
                format!("String shorter than minLength {min}"),
            ));
        }
        if let Some(pattern) = &schema.pattern {
            match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(text) {
                        out.push(Violation::new(
                            pointer,
                            format!("Value {value} does not match pattern {pattern}"),
                        ));
                    }
                }
                Err(_) => {
                    out.push(Violation::new(
                        pointer,
                        format!("Pattern {pattern} is not a valid regular expression"),
                    ));
                }
            }
        }
    }

    if let Value::Array(items) = value {
        if let Some(min) = schema.min_items
            && items.len() < min
        {
            out.push(Violation::new(
                pointer,
                format!("Array shorter than minItems {min}"),
            ));
        }
        if let Some(item_schema) = &schema.items {
            for (index, item) in items.iter().enumerate() {
                walk(item_schema, item, &format!("{pointer}/{index}"), out);
            }
        }
    }

    if let Value::Object(map) = value {
        if let Some(required) = &schema.required {
            for key in required {
                if !map.contains_key(key) {
                    out.push(Violation::new(
                        pointer,
                        format!("Missing required property \"{key}\""),
                    ));
                }
            }
        }
        for (key, child) in map {
            let child_pointer = format!("{pointer}/{key}");
            if let Some(child_schema) = schema.properties.as_ref().and_then(|p| p.get(key)) {
                walk(child_schema, child, &child_pointer, out);
                continue;
            }
            match &schema.additional_properties {
                Some(AdditionalProperties::Allowed(false)) => {
                    out.push(Violation::new(
                        pointer,
                        format!("Additional property \"{key}\" not allowed"),
                    ));
                }
                Some(AdditionalProperties::Schema(extra)) => {
                    walk(extra, child, &child_pointer, out);
                }
                Some(AdditionalProperties::Allowed(true)) | None => {}
            }
        }
    }
}
