//! Route handlers.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use iris_core::PipelineError;
use iris_media::decode_upload;
use iris_pipeline::SpeakOutcome;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::GatewayState;
use crate::upload::read_upload;

pub const NO_TEXT_NOTICE: &str =
    "No text found in the image. Please try another image with visible text.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeResponse {
    pub request_id: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPayload {
    pub mime_type: &'static str,
    pub base64: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakResponse {
    pub request_id: String,
    pub text: Option<String>,
    pub audio: Option<AudioPayload>,
    pub notice: Option<String>,
    pub speech_error: Option<String>,
}

/// Handler for `GET /api/health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Handler for `POST /api/describe`
pub async fn describe(
    State(state): State<GatewayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DescribeResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("http_describe", %request_id);
    run_describe(state, request_id, multipart).instrument(span).await
}

async fn run_describe(
    state: GatewayState,
    request_id: String,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DescribeResponse>, ApiError> {
    let upload = read_upload(multipart?).await?;
    info!(filename = %upload.filename, bytes = upload.data.len(), "Describe request");
    let image = decode_upload(upload).await?;

    let description = state
        .assistant
        .description()
        .describe_scene(image)
        .await
        .map_err(PipelineError::from)?;

    Ok(Json(DescribeResponse {
        request_id,
        description: description.into_string(),
    }))
}

/// Handler for `POST /api/speak`
///
/// An OCR failure is an error response. A synthesis failure still answers
/// 200 with the text and `speechError` set.
pub async fn speak(
    State(state): State<GatewayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SpeakResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("http_speak", %request_id);
    run_speak(state, request_id, multipart).instrument(span).await
}

async fn run_speak(
    state: GatewayState,
    request_id: String,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SpeakResponse>, ApiError> {
    let upload = read_upload(multipart?).await?;
    info!(filename = %upload.filename, bytes = upload.data.len(), "Speak request");
    let image = decode_upload(upload).await?;

    let outcome = state
        .assistant
        .speech()
        .extract_and_speak(image)
        .await
        .map_err(PipelineError::from)?;

    Ok(Json(speak_response(request_id, outcome)))
}

fn speak_response(request_id: String, outcome: SpeakOutcome) -> SpeakResponse {
    match outcome {
        SpeakOutcome::NoText => SpeakResponse {
            request_id,
            text: None,
            audio: None,
            notice: Some(NO_TEXT_NOTICE.to_string()),
            speech_error: None,
        },
        SpeakOutcome::Spoken { text, audio } => {
            let mime_type = audio.mime_type();
            SpeakResponse {
                request_id,
                text: Some(text.into_string()),
                audio: Some(AudioPayload {
                    mime_type,
                    base64: STANDARD.encode(audio.into_bytes()),
                }),
                notice: None,
                speech_error: None,
            }
        }
        SpeakOutcome::TextOnly { text, error } => SpeakResponse {
            request_id,
            text: Some(text.into_string()),
            audio: None,
            notice: None,
            speech_error: Some(error.to_string()),
        },
    }
}
