//! `iris-config`: Iris runtime configuration.
//!
//! Provides:
//! - Typed config schema (server, providers, timeouts, logging)
//! - YAML loading from `~/.iris/config.yaml`
//! - `${ENV_VAR}` substitution and environment overrides
//! - Config redaction for safe display
//! - Default value application and validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::{apply_all_defaults, apply_env_overrides};
pub use env::{
    contains_env_var_reference, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_raw};
pub use redact::{collect_literal_secrets, redact};
pub use schema::IrisConfig;
pub use validation::{validate, validate_env, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load a config file, substitute env vars, apply defaults and overrides,
/// then validate. This is the main entry point at runtime.
///
/// Warnings are logged; any validation error fails the load.
pub async fn load_and_prepare(path: &Path) -> Result<IrisConfig> {
    let (config, warnings) = load_checked(path, &std::env::vars().collect()).await?;
    for warning in &warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    Ok(config)
}

/// Like [`load_and_prepare`], against an explicit environment, returning
/// warnings to the caller instead of logging them. Useful when the logger
/// is configured from the loaded config itself.
pub async fn load_checked(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<(IrisConfig, Vec<ConfigValidationError>)> {
    let raw = load_raw(path).await?;
    let literal_secrets = collect_literal_secrets(&raw);

    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;
    let config: IrisConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);
    let config = apply_env_overrides(config, env);

    let mut report = validate(&config);
    validate_env(env, &mut report);
    for path in literal_secrets {
        report.warn(path, "Credential written literally in config; use a ${VAR} reference");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("{first} ({} error(s) in total)", report.errors.len());
    }

    Ok((config, report.warnings))
}
