// API type definitions
// Response bodies of the JSON endpoints

use serde::Serialize;

/// One regular file of the document root, as listed by `/api/files`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Local modification time, ISO 8601 with microseconds
    pub modified: String,
    /// Always `"file"`; directories are never listed
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Trailing extension with its dot, or empty
    pub extension: String,
}

impl FileEntry {
    pub const KIND_FILE: &'static str = "file";
}

/// Trailing extension of a file name, including the leading dot
///
/// Leading dots do not start an extension: `.bashrc` has none,
/// `archive.tar.gz` gives `.gz`, `notes.` gives `.`.
pub fn extension_of(name: &str) -> String {
    let stem_start = name.len() - name.trim_start_matches('.').len();
    name[stem_start..]
        .rfind('.')
        .map(|dot| name[stem_start + dot..].to_string())
        .unwrap_or_default()
}
