//! Turn an uploaded file into a pipeline-ready image.

use std::path::Path;

use bytes::Bytes;
use iris_core::ImageInput;
use thiserror::Error;
use tracing::debug;

use crate::mime_detect::{ACCEPTED_EXTENSIONS, detect_mime_type, is_accepted_image};

/// A file received from a user, before any decoding.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        detect_mime_type(Path::new(&self.filename))
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file type '{0}'; expected one of: jpg, jpeg, png")]
    UnsupportedExtension(String),

    #[error("uploaded file is empty")]
    Empty,

    #[error("could not decode image: {0}")]
    Decode(String),
}

/// Filter by extension, then decode and normalize to RGB.
pub fn accept_upload(upload: &Upload) -> Result<ImageInput, UploadError> {
    if !is_accepted_image(Path::new(&upload.filename)) {
        return Err(UploadError::UnsupportedExtension(upload.filename.clone()));
    }
    if upload.data.is_empty() {
        return Err(UploadError::Empty);
    }

    let image = ImageInput::decode(&upload.data).map_err(|e| UploadError::Decode(e.to_string()))?;
    debug!(
        filename = %upload.filename,
        mime = upload.mime_type(),
        width = image.width(),
        height = image.height(),
        accepted = ?ACCEPTED_EXTENSIONS,
        "Accepted image upload"
    );
    Ok(image)
}

/// [`accept_upload`] on the blocking pool, so decoding a large photo does not
/// stall the async runtime.
pub async fn decode_upload(upload: Upload) -> Result<ImageInput, UploadError> {
    tokio::task::spawn_blocking(move || accept_upload(&upload))
        .await
        .map_err(|e| UploadError::Decode(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encoded(format: ImageFormat) -> Bytes {
        let img = RgbImage::from_pixel(5, 5, Rgb([200, 40, 40]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        Bytes::from(buf.into_inner())
    }

    #[test]
    fn accepts_png_upload() {
        let upload = Upload::new("receipt.PNG", encoded(ImageFormat::Png));
        let image = accept_upload(&upload).unwrap();
        assert_eq!(image.width(), 5);
    }

    #[test]
    fn accepts_jpeg_upload() {
        let upload = Upload::new("street.jpeg", encoded(ImageFormat::Jpeg));
        assert!(accept_upload(&upload).is_ok());
    }

    #[test]
    fn rejects_other_extensions_before_decoding() {
        let upload = Upload::new("icon.gif", encoded(ImageFormat::Png));
        assert!(matches!(
            accept_upload(&upload),
            Err(UploadError::UnsupportedExtension(name)) if name == "icon.gif"
        ));
    }

    #[test]
    fn rejects_empty_and_corrupt_files() {
        let empty = Upload::new("a.png", Bytes::new());
        assert!(matches!(accept_upload(&empty), Err(UploadError::Empty)));

        let corrupt = Upload::new("a.png", Bytes::from_static(b"not a png"));
        assert!(matches!(accept_upload(&corrupt), Err(UploadError::Decode(_))));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn decode_upload_runs_on_blocking_pool() {
        let image = decode_upload(Upload::new("scan.png", encoded(ImageFormat::Png)))
            .await
            .unwrap();
        assert_eq!((image.width(), image.height()), (5, 5));

        let rejected = decode_upload(Upload::new("icon.gif", encoded(ImageFormat::Png))).await;
        assert!(matches!(rejected, Err(UploadError::UnsupportedExtension(_))));

        let corrupt = decode_upload(Upload::new("a.jpg", Bytes::from_static(b"garbage"))).await;
        assert!(matches!(corrupt, Err(UploadError::Decode(_))));
    }
}
