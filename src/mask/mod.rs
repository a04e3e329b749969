/// Image masking module
///
/// This module handles:
/// - Applying color and mosaic masks to a circular region (engine.rs)
/// - Decoding the current image off the UI thread (loader.rs)
/// - Writing masked images as opaque PNGs (export.rs)

pub mod engine;
pub mod export;
pub mod loader;
