//! Header name and value normalization.
//!
//! Response header keys are stored in one canonical (lower) case at write
//! time, so lookups only ever fold the name being searched for.

use serde_json::Value;

/// Returns the canonical form of a header name.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Normalizes a header value for storage.
///
/// String values are lower-cased when `lowercase` is set; every other
/// value is stored unchanged.
#[must_use]
pub fn normalize_value(value: Value, lowercase: bool) -> Value {
    match value {
        Value::String(s) if lowercase => Value::String(s.to_lowercase()),
        other => other,
    }
}

/// Renders a header value as text.
///
/// Arrays are joined with `,` so that a single-element list compares equal
/// to its only element.
#[must_use]
pub fn header_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(header_text)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("Content-Type"), "content-type");
        assert_eq!(canonical_name("X-REQUEST-ID"), "x-request-id");
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(
            normalize_value(json!("Application/JSON"), true),
            json!("application/json")
        );
        assert_eq!(
            normalize_value(json!("Application/JSON"), false),
            json!("Application/JSON")
        );
        assert_eq!(normalize_value(json!(42), true), json!(42));
        assert_eq!(normalize_value(json!(["A"]), true), json!(["A"]));
    }

    #[test]
    fn test_header_text() {
        assert_eq!(header_text(&json!("gzip")), "gzip");
        assert_eq!(header_text(&json!(["a=1", "b=2"])), "a=1,b=2");
        assert_eq!(header_text(&json!(["only"])), "only");
        assert_eq!(header_text(&json!(120)), "120");
        assert_eq!(header_text(&Value::Null), "");
    }
}
