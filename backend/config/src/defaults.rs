//! Config defaults: applies sensible default values to parsed config.

use std::collections::HashMap;

use crate::schema::{
    IrisConfig, LoggingConfig, OcrConfig, ServerConfig, SpeechConfig, TimeoutsConfig,
    VisionConfig,
};

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// 20 MiB, enough for full-resolution phone photos.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub const DEFAULT_VISION_PROVIDER: &str = "gemini";
pub const DEFAULT_VISION_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_SPEECH_PROVIDER: &str = "google_translate";
pub const DEFAULT_OCR_BINARY: &str = "tesseract";
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

pub const DEFAULT_VISION_SECS: u64 = 60;
pub const DEFAULT_OCR_SECS: u64 = 30;
pub const DEFAULT_SPEECH_SECS: u64 = 30;

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: IrisConfig) -> IrisConfig {
    let config = apply_server_defaults(config);
    let config = apply_provider_defaults(config);
    let config = apply_timeout_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: IrisConfig) -> IrisConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    server.max_upload_bytes.get_or_insert(DEFAULT_MAX_UPLOAD_BYTES);
    config
}

fn apply_provider_defaults(mut config: IrisConfig) -> IrisConfig {
    let vision = config.vision.get_or_insert_with(VisionConfig::default);
    let provider = vision
        .provider
        .get_or_insert_with(|| DEFAULT_VISION_PROVIDER.to_string());
    if provider.as_str() == DEFAULT_VISION_PROVIDER && vision.model.is_none() {
        vision.model = Some(DEFAULT_VISION_MODEL.to_string());
    }

    let ocr = config.ocr.get_or_insert_with(OcrConfig::default);
    ocr.binary.get_or_insert_with(|| DEFAULT_OCR_BINARY.to_string());
    ocr.language.get_or_insert_with(|| DEFAULT_OCR_LANGUAGE.to_string());

    let speech = config.speech.get_or_insert_with(SpeechConfig::default);
    speech
        .provider
        .get_or_insert_with(|| DEFAULT_SPEECH_PROVIDER.to_string());
    config
}

fn apply_timeout_defaults(mut config: IrisConfig) -> IrisConfig {
    let timeouts = config.timeouts.get_or_insert_with(TimeoutsConfig::default);
    timeouts.vision_secs.get_or_insert(DEFAULT_VISION_SECS);
    timeouts.ocr_secs.get_or_insert(DEFAULT_OCR_SECS);
    timeouts.speech_secs.get_or_insert(DEFAULT_SPEECH_SECS);
    config
}

fn apply_logging_defaults(mut config: IrisConfig) -> IrisConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| "info".to_string());
    config
}

/// Overlay environment variables on top of file values.
///
/// `IRIS_BIND`, `IRIS_PORT` and `IRIS_LOG_DIR` always win. Provider keys
/// (`GOOGLE_API_KEY`, `OPENAI_API_KEY`) only fill an `apiKey` the file left
/// empty, matched to the configured provider.
pub fn apply_env_overrides(mut config: IrisConfig, env: &HashMap<String, String>) -> IrisConfig {
    let non_empty = |name: &str| env.get(name).filter(|v| !v.is_empty()).cloned();

    let server = config.server.get_or_insert_with(ServerConfig::default);
    if let Some(bind) = non_empty("IRIS_BIND") {
        server.bind = Some(bind);
    }
    if let Some(port) = non_empty("IRIS_PORT").and_then(|p| p.parse().ok()) {
        server.port = Some(port);
    }
    if let Some(dir) = non_empty("IRIS_LOG_DIR") {
        config.logging.get_or_insert_with(LoggingConfig::default).dir = Some(dir);
    }

    let vision = config.vision.get_or_insert_with(VisionConfig::default);
    if vision.api_key.is_none() {
        vision.api_key = match vision.provider.as_deref().unwrap_or(DEFAULT_VISION_PROVIDER) {
            "openai" => non_empty("OPENAI_API_KEY"),
            _ => non_empty("GOOGLE_API_KEY"),
        };
    }

    let speech = config.speech.get_or_insert_with(SpeechConfig::default);
    if speech.api_key.is_none() && speech.provider.as_deref() == Some("openai") {
        speech.api_key = non_empty("OPENAI_API_KEY");
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_fill_every_section() {
        let config = apply_all_defaults(IrisConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.vision.unwrap().model.as_deref(), Some(DEFAULT_VISION_MODEL));
        assert_eq!(config.ocr.unwrap().language.as_deref(), Some("eng"));
        assert_eq!(config.speech.unwrap().provider.as_deref(), Some("google_translate"));
        assert_eq!(config.timeouts.unwrap().ocr_secs, Some(DEFAULT_OCR_SECS));
    }

    #[test]
    fn defaults_keep_explicit_values() {
        let mut config = IrisConfig::default();
        config.vision = Some(VisionConfig {
            provider: Some("openai".into()),
            ..Default::default()
        });
        let config = apply_all_defaults(config);
        let vision = config.vision.unwrap();
        assert_eq!(vision.provider.as_deref(), Some("openai"));
        assert!(vision.model.is_none());
    }

    #[test]
    fn env_supplies_matching_provider_key() {
        let config = apply_all_defaults(IrisConfig::default());
        let config = apply_env_overrides(
            config,
            &env(&[("GOOGLE_API_KEY", "AIza-test"), ("OPENAI_API_KEY", "sk-test"), ("IRIS_PORT", "9000")]),
        );
        assert_eq!(config.vision.as_ref().unwrap().api_key.as_deref(), Some("AIza-test"));
        assert!(config.speech.as_ref().unwrap().api_key.is_none());
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn file_key_wins_over_env() {
        let mut config = IrisConfig::default();
        config.vision = Some(VisionConfig {
            api_key: Some("from-file".into()),
            ..Default::default()
        });
        let config = apply_env_overrides(config, &env(&[("GOOGLE_API_KEY", "from-env")]));
        assert_eq!(config.vision.unwrap().api_key.as_deref(), Some("from-file"));
    }
}
