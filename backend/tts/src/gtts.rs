//! Google Translate speech endpoint, the backend used by gTTS.
//!
//! Needs no credential. Each request speaks at most 100 characters, so the
//! text is chunked and the MP3 segments are concatenated in order.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use tracing::{debug, info};

use crate::chunk::split_for_speech;
use crate::engine::{TtsProvider, TtsRequest};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

pub struct GoogleTranslateTts {
    base_url: String,
    client: Client,
}

impl Default for GoogleTranslateTts {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleTranslateTts {
    pub fn new() -> Self {
        Self {
            base_url: "https://translate.google.com".to_string(),
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Bytes> {
        let textlen = chunk.chars().count().to_string();
        let idx = idx.to_string();
        let total = total.to_string();
        let resp = self
            .client
            .get(format!("{}/translate_tts", self.base_url))
            .header("User-Agent", USER_AGENT)
            .header("Referer", format!("{}/", self.base_url))
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", language),
                ("client", "tw-ob"),
                ("ttsspeed", "1"),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .context("Google Translate TTS request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            bail!("Google Translate TTS error {status} for chunk {idx}/{total}");
        }
        Ok(resp.bytes().await?)
    }
}

#[async_trait]
impl TtsProvider for GoogleTranslateTts {
    fn name(&self) -> &str {
        "google_translate"
    }

    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes> {
        let chunks = split_for_speech(&req.text);
        if chunks.is_empty() {
            bail!("No speakable text in input");
        }
        info!(
            "[TTS/Google] Synthesizing {} chars in {} chunk(s), lang={}",
            req.text.chars().count(),
            chunks.len(),
            req.language
        );

        let mut audio = BytesMut::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let part = self.fetch_chunk(chunk, &req.language, idx, chunks.len()).await?;
            debug!(idx, bytes = part.len(), "Fetched speech chunk");
            audio.extend_from_slice(&part);
        }
        Ok(audio.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn concatenates_chunks_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .and(query_param("idx", "0"))
            .and(query_param("q", "Caution,"))
            .and(query_param("tl", "en"))
            .and(query_param("total", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"AAA".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .and(query_param("idx", "1"))
            .and(query_param("q", "wet floor."))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"BBB".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let tts = GoogleTranslateTts::new().with_base_url(server.uri());
        let req = TtsRequest {
            text: "Caution, wet floor.".into(),
            ..Default::default()
        };
        let audio = tts.synthesize(req).await.unwrap();
        assert_eq!(&audio[..], b"AAABBB");
    }

    #[tokio::test]
    async fn failed_chunk_fails_the_whole_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let tts = GoogleTranslateTts::new().with_base_url(server.uri());
        let req = TtsRequest {
            text: "Hello".into(),
            ..Default::default()
        };
        let err = tts.synthesize(req).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn unspeakable_text_is_rejected_without_requests() {
        let tts = GoogleTranslateTts::new().with_base_url("http://127.0.0.1:9");
        let req = TtsRequest {
            text: "...".into(),
            ..Default::default()
        };
        assert!(tts.synthesize(req).await.is_err());
    }
}
