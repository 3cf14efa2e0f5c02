/// Vision understanding: describe images using a hosted vision LLM.
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use iris_core::{VisionCapability, VisionRequest};
use reqwest::Client;
use serde_json::Value;
use tracing::info;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const OPENAI_BASE_URL: &str = "https://api.openai.com";

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

pub struct GeminiVision {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiVision {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-1.5-flash".to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl VisionCapability for GeminiVision {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn describe(&self, request: &VisionRequest) -> Result<String> {
        info!("[Vision] Describing image via Gemini {}", self.model);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [
                { "text": request.prompt() },
                { "inlineData": {
                    "mimeType": request.image().mime_type(),
                    "data": request.image().data()
                } }
            ]}]
        });
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;
        if !resp.status().is_success() {
            let status = resp.status();
            bail!("Gemini vision error {status}: {}", resp.text().await.unwrap_or_default());
        }
        let json: Value = resp.json().await.context("Gemini returned invalid JSON")?;
        gemini_text(&json)
    }
}

fn gemini_text(json: &Value) -> Result<String> {
    if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
        bail!("Gemini blocked the request: {reason}");
    }
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| anyhow!("Gemini response has no candidate content"))?;
    Ok(parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join(""))
}

// ---------------------------------------------------------------------------
// OpenAI-compatible chat completions
// ---------------------------------------------------------------------------

pub struct OpenAiVision {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: Client,
}

impl OpenAiVision {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
            max_tokens: 1024,
            client: Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl VisionCapability for OpenAiVision {
    fn name(&self) -> &str {
        "openai"
    }

    async fn describe(&self, request: &VisionRequest) -> Result<String> {
        info!("[Vision] Describing image via OpenAI {}", self.model);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": request.prompt() },
                    { "type": "image_url",
                      "image_url": { "url": request.image().data_url() } }
                ]
            }],
            "max_tokens": self.max_tokens
        });
        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("OpenAI request failed")?;
        if !resp.status().is_success() {
            let status = resp.status();
            bail!("OpenAI vision error {status}: {}", resp.text().await.unwrap_or_default());
        }
        let json: Value = resp.json().await.context("OpenAI returned invalid JSON")?;
        json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("OpenAI response has no message content"))
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

pub enum VisionProviderKind {
    Gemini {
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
    },
    OpenAi {
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
    },
}

pub fn create_vision(kind: VisionProviderKind) -> Arc<dyn VisionCapability> {
    match kind {
        VisionProviderKind::Gemini { api_key, model, base_url } => {
            let mut vision = GeminiVision::new(api_key);
            if let Some(model) = model {
                vision = vision.with_model(model);
            }
            if let Some(url) = base_url {
                vision = vision.with_base_url(url);
            }
            Arc::new(vision)
        }
        VisionProviderKind::OpenAi { api_key, model, base_url } => {
            let mut vision = OpenAiVision::new(api_key);
            if let Some(model) = model {
                vision = vision.with_model(model);
            }
            if let Some(url) = base_url {
                vision = vision.with_base_url(url);
            }
            Arc::new(vision)
        }
    }
}
