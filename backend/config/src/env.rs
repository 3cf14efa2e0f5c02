//! Environment variable substitution for config values.
//!
//! Supports `${VAR_NAME}` syntax in string values, resolved at load time.
//! Only uppercase `[A-Z_][A-Z0-9_]*` variable names are matched.
//! `$${VAR}` escapes to a literal `${VAR}`.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

/// A reference, optionally preceded by the `$` escape.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references throughout a config value tree using the
/// process environment. Fails if a referenced var is unset or empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    Ok(substitute_value(value, env, "")?)
}

fn substitute_value(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => substitute_string(s, env, path).map(Value::String),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(substituted.into_owned()),
    }
}

/// Check whether a string contains any unescaped env var reference.
pub fn contains_env_var_reference(s: &str) -> bool {
    ENV_VAR_PATTERN
        .captures_iter(s)
        .any(|caps| caps[1].is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"apiKey": "${GOOGLE_API_KEY}"});
        let env = env(&[("GOOGLE_API_KEY", "AIza-abc123")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["apiKey"], "AIza-abc123");
    }

    #[test]
    fn error_on_missing_var_names_path() {
        let v = json!({"vision": {"apiKey": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("MISSING_VAR"));
        assert!(message.contains("vision.apiKey"));
    }

    #[test]
    fn empty_var_counts_as_missing() {
        let v = json!({"key": "${EMPTY}"});
        assert!(resolve_env_vars_with(&v, &env(&[("EMPTY", "")])).is_err());
    }

    #[test]
    fn escaped_reference_is_kept_literally() {
        let v = json!({"note": "use $${HOME} here, ${USER} there"});
        let result = resolve_env_vars_with(&v, &env(&[("USER", "ana")])).unwrap();
        assert_eq!(result["note"], "use ${HOME} here, ana there");
    }

    #[test]
    fn passthrough_non_var_strings_and_numbers() {
        let v = json!({"key": "plain-string", "port": 8080, "list": ["a", "${X}"]});
        let result = resolve_env_vars_with(&v, &env(&[("X", "b")])).unwrap();
        assert_eq!(result["key"], "plain-string");
        assert_eq!(result["port"], 8080);
        assert_eq!(result["list"][1], "b");
    }

    #[test]
    fn detects_references() {
        assert!(contains_env_var_reference("${GOOGLE_API_KEY}"));
        assert!(!contains_env_var_reference("$${GOOGLE_API_KEY}"));
        assert!(!contains_env_var_reference("AIza-literal"));
    }
}
