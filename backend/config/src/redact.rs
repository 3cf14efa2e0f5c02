//! Config redaction: produce safe-to-print config snapshots by masking credentials.

use serde_json::Value;

use crate::env::contains_env_var_reference;

static SENSITIVE_KEYS: &[&str] = &["apiKey", "api_key", "apikey", "token", "secret"];

/// Redact a config JSON value, replacing credentials with a short hint.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if !is_sensitive_key(key) || s.is_empty() {
        return Value::String(s.to_string());
    }
    let hint: String = s.chars().take(4).collect();
    if s.chars().count() > 8 {
        Value::String(format!("{hint}***"))
    } else {
        Value::String("***".to_string())
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}

/// Paths of credential fields written literally in the file rather than
/// referenced as `${VAR}`. Run on the raw tree, before substitution.
pub fn collect_literal_secrets(raw: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_recursive(raw, "", &mut paths);
    paths
}

fn collect_recursive(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() => {
            let key = path.rsplit('.').next().unwrap_or("");
            if is_sensitive_key(key) && !contains_env_var_reference(s) {
                out.push(path.to_string());
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                collect_recursive(v, &child_path, out);
            }
        }
        _ => {}
    }
}
