//! Image decoding for the current image
//!
//! Decoding a large JPEG can take a noticeable moment, so it runs on
//! tokio's blocking pool. The result is tagged with the generation that
//! requested it; the session drops results that arrive after the user
//! has already moved on.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use tokio::task;

use crate::error::{Error, Result};

/// A decoded image ready to hand to the session
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub path: PathBuf,
    pub pixels: RgbaImage,
}

/// Outcome of a background load, tagged with its request generation
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub generation: u64,
    pub path: PathBuf,
    /// Decoded pixels, or the user-facing error message
    pub outcome: std::result::Result<DecodedImage, String>,
}

/// Decode `path` on the blocking pool
pub async fn load_image(path: PathBuf, generation: u64) -> LoadResult {
    let task_path = path.clone();
    let outcome = task::spawn_blocking(move || load_image_blocking(&task_path))
        .await
        .map_err(|e| Error::Task(e.to_string()))
        .and_then(|result| result)
        .map_err(|e| e.to_string());

    LoadResult {
        generation,
        path,
        outcome,
    }
}

/// Blocking implementation of image loading
pub fn load_image_blocking(path: &Path) -> Result<DecodedImage> {
    let decoded = image::open(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let pixels = decoded.to_rgba8();
    tracing::info!("loaded {} ({}x{})", path.display(), pixels.width(), pixels.height());

    Ok(DecodedImage {
        path: path.to_path_buf(),
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[tokio::test]
    async fn test_load_missing_file_reports_path() {
        let result = load_image(PathBuf::from("/nonexistent/path.png"), 7).await;
        assert_eq!(result.generation, 7);
        let message = result.outcome.unwrap_err();
        assert!(message.contains("/nonexistent/path.png"), "{message}");
    }

    #[tokio::test]
    async fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255])).save(&path).unwrap();

        let result = load_image(path.clone(), 1).await;
        let decoded = result.outcome.unwrap();
        assert_eq!(decoded.path, path);
        assert_eq!(decoded.pixels.dimensions(), (4, 3));
        assert_eq!(*decoded.pixels.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        assert!(matches!(load_image_blocking(&path), Err(Error::Decode { .. })));
    }
}
