//! Iris runtime configuration schema.
//!
//! Every field is optional in the file; [`crate::apply_all_defaults`] fills
//! in the rest after loading.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_BIND, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_OCR_SECS, DEFAULT_PORT, DEFAULT_SPEECH_SECS,
    DEFAULT_VISION_SECS,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrisConfig {
    /// HTTP gateway settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Scene description provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<VisionConfig>,

    /// Text recognition engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrConfig>,

    /// Speech synthesis provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<SpeechConfig>,

    /// Bounds on external capability calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Largest accepted request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionConfig {
    /// "gemini" | "openai"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrConfig {
    /// Path or name of the tesseract executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    /// Tesseract language pack, e.g. "eng"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    /// "google_translate" | "openai"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling JSON log files; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Effective values
// ---------------------------------------------------------------------------

impl IrisConfig {
    pub fn bind_address(&self) -> String {
        let server = self.server.as_ref();
        let bind = server.and_then(|s| s.bind.as_deref()).unwrap_or(DEFAULT_BIND);
        let port = server.and_then(|s| s.port).unwrap_or(DEFAULT_PORT);
        format!("{bind}:{port}")
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server
            .as_ref()
            .and_then(|s| s.max_upload_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn vision_timeout(&self) -> Duration {
        let secs = self.timeouts.as_ref().and_then(|t| t.vision_secs);
        Duration::from_secs(secs.unwrap_or(DEFAULT_VISION_SECS))
    }

    pub fn ocr_timeout(&self) -> Duration {
        let secs = self.timeouts.as_ref().and_then(|t| t.ocr_secs);
        Duration::from_secs(secs.unwrap_or(DEFAULT_OCR_SECS))
    }

    pub fn speech_timeout(&self) -> Duration {
        let secs = self.timeouts.as_ref().and_then(|t| t.speech_secs);
        Duration::from_secs(secs.unwrap_or(DEFAULT_SPEECH_SECS))
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }
}
