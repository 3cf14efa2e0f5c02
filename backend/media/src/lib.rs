//! Upload intake: extension filtering, MIME labels, and decoding into `ImageInput`.

pub mod mime_detect;
pub mod upload;

pub use mime_detect::{ACCEPTED_EXTENSIONS, detect_mime_type, is_accepted_image};
pub use upload::{Upload, UploadError, accept_upload, decode_upload};
