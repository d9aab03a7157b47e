use serde_json::Value;

/// Truthiness of an evaluated expression. `None` stands for `undefined`.
///
/// `undefined`, `null`, `false`, `0`, `NaN` and the empty string are falsy,
/// everything else (including empty arrays and objects) is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Text written into a `t-esc` slot.
pub fn to_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        // compact JSON for structured values
        Some(other) => other.to_string(),
    }
}
