//! MIME type detection for uploads.

use std::path::Path;

/// File extensions accepted for image uploads.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Detect MIME type by file extension. Only accepted image types are named.
pub fn detect_mime_type(path: &Path) -> &'static str {
    match extension_of(path).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// Whether a filename carries one of the accepted image extensions.
pub fn is_accepted_image(path: &Path) -> bool {
    let ext = extension_of(path);
    ACCEPTED_EXTENSIONS.contains(&ext.as_str())
}
