//! Content-type-aware delivery classification.
//!
//! A fixed allow-list of browser-renderable extensions is served inline with
//! an explicit content type; everything else is sent as a forced attachment
//! using the original filename. This is a pure lookup on the file extension,
//! never a sniff of the file bytes.

/// How a downloaded file should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Render in the browser with the given content type.
    Inline(&'static str),
    /// Force a download attachment under the original filename.
    Attachment,
}

/// Classify a lowercase file extension (without the leading dot).
pub fn classify(extension: &str) -> Disposition {
    match extension {
        "jpg" | "jpeg" => Disposition::Inline("image/jpeg"),
        "png" => Disposition::Inline("image/png"),
        "gif" => Disposition::Inline("image/gif"),
        "bmp" => Disposition::Inline("image/bmp"),
        "webp" => Disposition::Inline("image/webp"),
        "svg" => Disposition::Inline("image/svg+xml"),
        "mp4" => Disposition::Inline("video/mp4"),
        "webm" => Disposition::Inline("video/webm"),
        "ogg" => Disposition::Inline("video/ogg"),
        "mov" => Disposition::Inline("video/quicktime"),
        "m4v" => Disposition::Inline("video/x-m4v"),
        "avi" => Disposition::Inline("video/x-msvideo"),
        "mp3" => Disposition::Inline("audio/mpeg"),
        "wav" => Disposition::Inline("audio/wav"),
        "aac" => Disposition::Inline("audio/aac"),
        "flac" => Disposition::Inline("audio/flac"),
        "m4a" => Disposition::Inline("audio/mp4"),
        "pdf" => Disposition::Inline("application/pdf"),
        _ => Disposition::Attachment,
    }
}
