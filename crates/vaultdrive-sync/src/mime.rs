//! Extension→MIME table for uploads
//!
//! A fixed table covering the file types commonly found in a vault.
//! Unknown extensions fall back to a generic binary type. The textual
//! set decides whether content crosses the engine as UTF-8 text or as
//! raw bytes.

/// MIME type for extensions the table does not know
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// Maps a file extension (without the dot) to its MIME type
///
/// Lookup is case-insensitive. `None` and unknown extensions map to
/// [`UNKNOWN_MIME`].
#[must_use]
pub fn mime_type_for_extension(extension: Option<&str>) -> &'static str {
    let Some(extension) = extension else {
        return UNKNOWN_MIME;
    };

    match extension.to_ascii_lowercase().as_str() {
        "md" => "text/markdown",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "html" => "text/html",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "zip" => "application/zip",
        _ => UNKNOWN_MIME,
    }
}

/// Returns true if files with this extension are read and written as text
///
/// Everything else is treated as raw bytes.
#[must_use]
pub fn is_textual_extension(extension: Option<&str>) -> bool {
    let Some(extension) = extension else {
        return false;
    };

    matches!(
        extension.to_ascii_lowercase().as_str(),
        "md" | "txt" | "csv" | "json" | "html" | "svg" | "css" | "js" | "yaml" | "yml" | "xml"
    )
}
