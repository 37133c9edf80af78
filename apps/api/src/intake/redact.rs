use serde_json::Value;

const PII_FIELDS: &[&str] = &["email", "phoneHome", "phoneCell", "phone", "dob", "ssn"];
const REDACTED: &str = "***REDACTED***";

/// Copy of `value` with personal fields masked at any depth. Use before logging
/// anything an applicant typed.
pub fn mask_pii(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| {
                    let masked = if PII_FIELDS.contains(&key.as_str()) && !is_empty(v) {
                        Value::String(REDACTED.to_string())
                    } else {
                        mask_pii(v)
                    };
                    (key.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(mask_pii).collect()),
        other => other.clone(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
