//! MIME type detection module
//!
//! A general extension table is consulted first, then override rules are
//! applied in order. New overrides only need a row in `OVERRIDES`.

use std::path::Path;

/// Suffix overrides applied after the table, first match wins
const OVERRIDES: &[(&str, &str)] = &[(".mp3", "audio/mpeg")];

/// Content-Type for a request path or file name
pub fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    apply_overrides(path, get_content_type(extension.as_deref()))
}

/// Apply `OVERRIDES` to a type already chosen by the table
pub fn apply_overrides(path: &str, base: &'static str) -> &'static str {
    OVERRIDES
        .iter()
        .find(|&&(suffix, _)| path.ends_with(suffix))
        .map_or(base, |&(_, content_type)| content_type)
}

/// Get MIME Content-Type based on file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",

        // Scripts
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",
        Some("py") => "text/x-python",
        Some("sh") => "application/x-sh",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Audio
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg" | "oga") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",

        // Video
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogv") => "video/ogg",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        // Archives and documents
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "gzip") => "application/gzip",
        Some("tar") => "application/x-tar",

        _ => "application/octet-stream",
    }
}
