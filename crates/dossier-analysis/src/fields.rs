//! Field accessors for rendering model results
//!
//! Model output is a loosely-shaped JSON tree; these helpers read it
//! defensively so the renderers stay total: a missing or null field turns
//! into the caller's placeholder, and non-string scalars render through
//! their JSON form.

use serde_json::Value;

/// Placeholder for a field missing from an application analysis
pub const MISSING: &str = "信息缺失";

/// Placeholder for a field missing from a transcript verification
pub const NOT_PROVIDED: &str = "未提供";

/// Read a field as display text, with a default for absent or null values
pub fn text_or(value: &Value, key: &str, default: &str) -> String {
    match value.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Descend into a nested object; absent children read as null
pub fn nested<'a>(value: &'a Value, key: &str) -> &'a Value {
    value.get(key).unwrap_or(&Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_field_passes_through() {
        let value = json!({"name": "Li Hua"});
        assert_eq!(text_or(&value, "name", MISSING), "Li Hua");
    }

    #[test]
    fn test_missing_and_null_use_default() {
        let value = json!({"gender": null});
        assert_eq!(text_or(&value, "gender", MISSING), MISSING);
        assert_eq!(text_or(&value, "absent", MISSING), MISSING);
    }

    #[test]
    fn test_numeric_field_renders() {
        let value = json!({"credits": 3.5});
        assert_eq!(text_or(&value, "credits", "0"), "3.5");
    }

    #[test]
    fn test_nested_absent_is_null() {
        let value = json!({"gpa": {"score": "3.8"}});
        assert_eq!(text_or(nested(&value, "gpa"), "score", MISSING), "3.8");
        assert_eq!(
            text_or(nested(&value, "nothing"), "score", MISSING),
            MISSING
        );
    }
}
