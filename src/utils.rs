//! Small helpers shared across the upload and archival paths

/// The filename with its final extension removed. Filenames without a
/// dot are returned unchanged.
pub fn file_stem(filename: &str) -> String {
    match filename.rfind('.') {
        Some(0) | None => filename.to_string(),
        Some(idx) => filename[..idx].to_string(),
    }
}

/// Lowercased extension of a path-like string, without the dot.
pub fn extension(path: &str) -> Option<String> {
    std::path::Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}
