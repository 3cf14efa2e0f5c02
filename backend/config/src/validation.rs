//! Config validation with user-friendly error messages.

use crate::schema::IrisConfig;
use std::collections::HashMap;
use thiserror::Error;

pub const VISION_PROVIDERS: &[&str] = &["gemini", "openai"];
pub const SPEECH_PROVIDERS: &[&str] = &["google_translate", "openai"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &IrisConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_vision(config, &mut report);
    validate_ocr(config, &mut report);
    validate_speech(config, &mut report);
    validate_timeouts(config, &mut report);
    report
}

/// Flag override variables that are set but cannot be applied.
///
/// The override pass skips them, so the file or default value stays in effect.
pub fn validate_env(env: &HashMap<String, String>, report: &mut ValidationReport) {
    if let Some(port) = env.get("IRIS_PORT").filter(|p| !p.is_empty()) {
        if port.parse::<u16>().is_err() {
            report.warn(
                "IRIS_PORT",
                format!("'{port}' is not a valid port number; ignoring the override"),
            );
        }
    }
}

fn validate_server(config: &IrisConfig, report: &mut ValidationReport) {
    let Some(server) = &config.server else { return };
    if let Some(port) = server.port {
        if port < 1024 && port != 80 && port != 443 {
            report.warn(
                "server.port",
                format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
            );
        }
    }
    if server.max_upload_bytes == Some(0) {
        report.error("server.maxUploadBytes", "maxUploadBytes must be > 0");
    }
}

fn validate_vision(config: &IrisConfig, report: &mut ValidationReport) {
    let Some(vision) = &config.vision else { return };
    if let Some(provider) = &vision.provider {
        if !VISION_PROVIDERS.contains(&provider.as_str()) {
            report.error(
                "vision.provider",
                format!("Unknown vision provider '{provider}'. Use 'gemini' or 'openai'"),
            );
        }
    }
    if vision.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
        report.warn(
            "vision.apiKey",
            "No vision API key; scene description will be unavailable",
        );
    }
}

fn validate_ocr(config: &IrisConfig, report: &mut ValidationReport) {
    let Some(ocr) = &config.ocr else { return };
    if ocr.binary.as_deref().map(str::trim) == Some("") {
        report.error("ocr.binary", "OCR binary cannot be empty");
    }
    if ocr.language.as_deref().map(str::trim) == Some("") {
        report.error("ocr.language", "OCR language cannot be empty");
    }
}

fn validate_speech(config: &IrisConfig, report: &mut ValidationReport) {
    let Some(speech) = &config.speech else { return };
    let Some(provider) = &speech.provider else { return };
    if !SPEECH_PROVIDERS.contains(&provider.as_str()) {
        report.error(
            "speech.provider",
            format!("Unknown speech provider '{provider}'. Use 'google_translate' or 'openai'"),
        );
    } else if provider == "openai" && speech.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
        report.error("speech.apiKey", "OpenAI speech requires an API key");
    }
}

fn validate_timeouts(config: &IrisConfig, report: &mut ValidationReport) {
    let Some(timeouts) = &config.timeouts else { return };
    let fields = [
        ("timeouts.visionSecs", timeouts.vision_secs),
        ("timeouts.ocrSecs", timeouts.ocr_secs),
        ("timeouts.speechSecs", timeouts.speech_secs),
    ];
    for (path, secs) in fields {
        if secs == Some(0) {
            report.error(path, "Timeout must be > 0 seconds");
        }
    }
}
