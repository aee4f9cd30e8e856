//! Image archival pipeline
//!
//! decode -> auto-rotate (EXIF orientation) -> resize to <= 800 px wide
//! (never upscale) -> lossy WebP re-encode -> upload to object storage
//! under `<stem>.webp` -> unlink the local intermediate.
//!
//! Unsupported extensions are rejected before any file or network I/O.
//! Every other step failure is surfaced as a single aggregated
//! processing-failed error carrying the cause; there is no cleanup
//! guarantee beyond the explicit unlink after a successful upload.

use image::{imageops::FilterType, DynamicImage};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

use crate::errors::ArchiveError;
use crate::storage::ObjectStore;

const MAX_WIDTH: u32 = 800;
const WEBP_QUALITY: f32 = 80.0;
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "gif"];

#[derive(Clone)]
pub struct ArchivalPipeline {
    store: Arc<dyn ObjectStore>,
}

impl ArchivalPipeline {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Convert and archive a previously staged original.
    ///
    /// Returns the object key the converted image was uploaded under.
    pub async fn archive(&self, input_path: &Path) -> Result<String, ArchiveError> {
        let path_str = input_path.display().to_string();

        let extension = crate::utils::extension(&path_str).unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ArchiveError::UnsupportedFormat { path: path_str });
        }

        let data = fs::read(input_path)
            .await
            .map_err(|e| ArchiveError::processing_failed(&path_str, e.to_string()))?;

        let orientation = crate::exif::orientation(&data);
        let decoded = image::load_from_memory(&data)
            .map_err(|e| ArchiveError::processing_failed(&path_str, e.to_string()))?;
        let prepared = prepare(decoded, orientation);

        let webp_data = encode_webp(&prepared)
            .map_err(|e| ArchiveError::processing_failed(&path_str, e))?;

        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let key = format!("{stem}.webp");
        let intermediate = input_path.with_file_name(&key);

        fs::write(&intermediate, &webp_data)
            .await
            .map_err(|e| ArchiveError::processing_failed(&path_str, e.to_string()))?;

        self.store
            .put(&key, webp_data, "image/webp")
            .await
            .map_err(|e| ArchiveError::processing_failed(&path_str, e.to_string()))?;

        fs::remove_file(&intermediate)
            .await
            .map_err(|e| ArchiveError::processing_failed(&path_str, e.to_string()))?;

        info!("Archived {} as {}", path_str, key);
        Ok(key)
    }
}

/// Auto-rotate per the EXIF orientation value, then cap the width at
/// [`MAX_WIDTH`] preserving aspect ratio. Smaller images pass through
/// unscaled.
pub fn prepare(image: DynamicImage, orientation: u32) -> DynamicImage {
    let oriented = apply_orientation(image, orientation);
    if oriented.width() > MAX_WIDTH {
        oriented.resize(MAX_WIDTH, oriented.height(), FilterType::Lanczos3)
    } else {
        oriented
    }
}

fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

fn encode_webp(image: &DynamicImage) -> Result<Vec<u8>, String> {
    // The lossy encoder takes RGB8/RGBA8 input only.
    let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
    let encoder = webp::Encoder::from_image(&rgba).map_err(|e| e.to_string())?;
    Ok(encoder.encode(WEBP_QUALITY).to_vec())
}
