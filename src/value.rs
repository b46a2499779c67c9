//! Small helpers over [`serde_json::Value`].
//!
//! Source payloads arrive untyped, so the engine and the repair layer need
//! a shared notion of "truthy", "blank" and "coerce this scalar to text".

use serde_json::{Map, Number, Value};

/// Dynamic truthiness: null, false, zero, and empty strings/arrays/objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// True when the value is absent, null, or a whitespace-only string.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// True when the value is neither null nor a whitespace-only string.
pub fn is_present(value: &Value) -> bool {
    !is_blank(Some(value))
}

/// Render a scalar as text. Arrays and objects have no text form.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerce a scalar to a JSON number; numeric strings are parsed.
pub fn as_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let parsed = s.trim().replace(',', ".").parse::<f64>().ok()?;
            Number::from_f64(parsed).map(Value::Number)
        }
        _ => None,
    }
}

/// Integer view of a value, accepting numeric strings such as `"9"`.
pub fn as_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Replace `slot` with an empty object unless it already is one.
pub fn object_slot(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

/// Replace `slot` with an empty array unless it already is one.
pub fn array_slot(slot: &mut Value) -> &mut Vec<Value> {
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => items,
        _ => unreachable!("slot was just replaced with an array"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([1])));
    }

    #[test]
    fn test_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!("  "))));
        assert!(!is_blank(Some(&json!(0))));
    }

    #[test]
    fn test_coercions() {
        assert_eq!(as_text(&json!(75001)), Some("75001".to_string()));
        assert_eq!(as_number(&json!("550,5")), Some(json!(550.5)));
        assert_eq!(as_number(&json!("n/a")), None);
        assert_eq!(as_code(&json!("9")), Some(9));
    }

    #[test]
    fn test_slots_replace_wrong_types() {
        let mut v = json!("text");
        object_slot(&mut v).insert("a".into(), json!(1));
        assert_eq!(v, json!({"a": 1}));

        let mut v = json!({"a": 1});
        array_slot(&mut v).push(json!(2));
        assert_eq!(v, json!([2]));
    }
}
