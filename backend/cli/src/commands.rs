use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use iris_config::{redact, IrisConfig};
use iris_core::ImageInput;
use iris_gateway::{start_server, GatewayState};
use iris_media::{decode_upload, Upload};
use iris_pipeline::SpeakOutcome;
use tracing::{info, warn};

use crate::wiring::{build_assistant, build_description, build_speech};

pub async fn serve(config: &IrisConfig) -> Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.bind_address()))?;
    let assistant = build_assistant(config)?;

    info!(
        %addr,
        max_upload_bytes = config.max_upload_bytes(),
        "Starting Iris gateway"
    );
    start_server(addr, GatewayState::new(assistant), config.max_upload_bytes()).await
}

pub async fn describe(config: &IrisConfig, image: &Path) -> Result<()> {
    let pipeline = build_description(config)?;
    let input = read_image(image).await?;
    let description = pipeline.describe_scene(input).await?;
    println!("{description}");
    Ok(())
}

pub async fn speak(config: &IrisConfig, image: &Path, out: &Path) -> Result<()> {
    let pipeline = build_speech(config)?;
    let input = read_image(image).await?;

    match pipeline.extract_and_speak(input).await? {
        SpeakOutcome::NoText => {
            println!("No text found in the image. Please try another image with visible text.");
        }
        SpeakOutcome::Spoken { text, audio } => {
            println!("{text}");
            let bytes = audio.len();
            tokio::fs::write(out, audio.into_bytes())
                .await
                .with_context(|| format!("Failed to write audio to {}", out.display()))?;
            info!(path = %out.display(), bytes, "Wrote speech audio");
        }
        SpeakOutcome::TextOnly { text, error } => {
            println!("{text}");
            warn!("Text was found but could not be read aloud: {error}");
        }
    }
    Ok(())
}

pub fn show_config(config: &IrisConfig) -> Result<()> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    let yaml = serde_yaml::to_string(&redact(&value)).context("Failed to render config")?;
    print!("{yaml}");
    Ok(())
}

async fn read_image(path: &Path) -> Result<ImageInput> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(decode_upload(Upload::new(filename, data)).await?)
}
