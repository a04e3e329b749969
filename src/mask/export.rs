use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Output path for a source image: `<stem>.png` inside `output_dir`.
///
/// Always PNG whatever the source extension, so `a.jpg` and `a.png`
/// share one output file.
pub fn output_path(source: &Path, output_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    output_dir.join(format!("{}.png", stem))
}

/// Write `pixels` without alpha as a PNG next to its siblings in
/// `output_dir`. Returns the written path.
pub fn save_png(pixels: &RgbaImage, source: &Path, output_dir: &Path) -> Result<PathBuf> {
    let path = output_path(source, output_dir);

    let opaque = DynamicImage::ImageRgba8(pixels.clone()).to_rgb8();
    opaque
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|source| Error::Save {
            path: path.clone(),
            source,
        })?;

    tracing::info!("saved masked image to {}", path.display());
    Ok(path)
}
