use axum::extract::Multipart;
use iris_media::Upload;

use crate::error::ApiError;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// Pull the `file` field out of a multipart body. Other fields are skipped.
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        return Ok(Upload::new(filename, data));
    }
    Err(ApiError::bad_request("missing multipart field 'file'"))
}
