//! String coercion for generic data maps.
//!
//! The gateway requires every `data` map to be a flat string-to-string
//! object. Structured values are JSON-encoded, scalars are stringified.

use std::collections::BTreeMap;

use serde_json::Value;

/// Wire form of a data map. Ordered so rendering is deterministic.
pub type DataMap = BTreeMap<String, String>;

/// Convert a single value to its wire string.
///
/// Objects and arrays become their JSON encoding and strings pass through.
/// Numbers use their display form. `true` becomes `"1"`; `false` and `null`
/// become `""`.
pub fn coerce_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Object(_) | Value::Array(_) => value.to_string(),
    }
}

/// Coerce every value of a JSON object.
pub fn coerce_map(entries: &serde_json::Map<String, Value>) -> DataMap {
    entries
        .iter()
        .map(|(key, value)| (key.clone(), coerce_value(value)))
        .collect()
}

/// Merge key/value pairs into an accumulating JSON object, later keys win.
pub(crate) fn merge_entries<I, K, V>(target: &mut serde_json::Map<String, Value>, entries: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    for (key, value) in entries {
        target.insert(key.into(), value.into());
    }
}
