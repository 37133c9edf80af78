use serde_json::{Map, Value};

/// Deep-merges a partial document into an existing one and returns the result.
///
/// Objects merge key by key; any other incoming value (strings including `""`,
/// numbers, booleans, `null`, whole arrays) replaces what was there. Keys the
/// partial does not mention are left alone.
pub fn merge(existing: &Value, incoming: &Value) -> Value {
    match (existing, incoming) {
        (Value::Object(base), Value::Object(patch)) => Value::Object(merge_maps(base, patch)),
        _ => incoming.clone(),
    }
}

fn merge_maps(base: &Map<String, Value>, patch: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in patch {
        let next = match (merged.get(key), value) {
            (Some(current @ Value::Object(_)), Value::Object(_)) => merge(current, value),
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

/// Shallow overlay used when re-rendering a rejected step: top-level keys of
/// `overlay` win outright.
pub fn overlay(existing: &Value, overlay: &Map<String, Value>) -> Value {
    let mut shown = match existing {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for (key, value) in overlay {
        shown.insert(key.clone(), value.clone());
    }
    Value::Object(shown)
}
