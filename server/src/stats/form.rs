use serde_json::{Map, Number, Value};

/// Free-text field that must never be coerced to a number.
const FREE_TEXT_FIELD: &str = "serve_target";

/// Coerces manual-entry form fields into JSON values.
///
/// Empty values are dropped, `"true"`/`"false"` become booleans, numeric-looking
/// values become numbers (except the serve target), and everything else is kept
/// as a string.
pub fn merge_form_fields<I, K, V>(fields: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    let mut merged = Map::new();
    for (key, value) in fields {
        let key = key.into();
        let raw = value.as_ref();
        if raw.is_empty() {
            continue;
        }
        let coerced = match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ if key != FREE_TEXT_FIELD => {
                numeric(raw).unwrap_or_else(|| Value::String(raw.to_string()))
            }
            _ => Value::String(raw.to_string()),
        };
        merged.insert(key, coerced);
    }
    merged
}

/// Lays the coerced form fields over the base record fields. A form field
/// replaces a base field of the same name.
pub fn merge_into(base: Map<String, Value>, fields: Map<String, Value>) -> Map<String, Value> {
    let mut payload = base;
    payload.extend(fields);
    payload
}

fn numeric(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    let f = trimmed.parse::<f64>().ok().filter(|f| f.is_finite())?;
    // "1.0" reads as 1 so it still fits integer fields.
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        return Some(Value::Number((f as i64).into()));
    }
    Number::from_f64(f).map(Value::Number)
}
