//! Rendering JSON test-case values as Python source literals.

use serde_json::Value;

/// Renders `value` as a Python expression.
///
/// `null` becomes `None`, booleans become `True`/`False`, strings keep JSON
/// escaping (valid Python), lists use `", "` separators and objects render as
/// dict literals.
pub fn python_literal(value: &Value) -> String {
    let mut out = String::new();
    write_literal(value, &mut out);
    out
}

fn write_literal(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&quote(s)),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&quote(k));
                out.push_str(": ");
                write_literal(v, out);
            }
            out.push('}');
        }
    }
}

fn quote(s: &str) -> String {
    // A JSON string literal is also a valid Python string literal.
    Value::String(s.to_owned()).to_string()
}
