//! Shared data structures for the masking session
//!
//! These types flow between the session model, the mask engine
//! and the UI layer.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Edge length of a mosaic block in source pixels
pub const MOSAIC_BLOCK_SIZE: u32 = 16;

/// Smallest brush radius in source pixels
pub const MIN_RADIUS: f32 = 20.0;

/// Brush radius used before the user scrolls
pub const DEFAULT_RADIUS: f32 = 256.0;

/// Radius change per mouse wheel notch
pub const RADIUS_STEP: f32 = 20.0;

/// Which kind of mask the user picked (persisted as `mask_type`)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskKind {
    #[default]
    Color,
    Mosaic,
}

impl MaskKind {
    pub const ALL: [MaskKind; 2] = [MaskKind::Color, MaskKind::Mosaic];
}

impl fmt::Display for MaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskKind::Color => write!(f, "Color"),
            MaskKind::Mosaic => write!(f, "Mosaic"),
        }
    }
}

/// A fully resolved mask, ready for the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskSpec {
    /// Solid fill, alpha-composited when the color is translucent
    Color(Rgba<u8>),
    /// Nearest-neighbour pixelation with square blocks
    Mosaic { block_size: u32 },
}

impl MaskSpec {
    pub fn new(kind: MaskKind, color: Rgba<u8>) -> Self {
        match kind {
            MaskKind::Color => MaskSpec::Color(color),
            MaskKind::Mosaic => MaskSpec::Mosaic {
                block_size: MOSAIC_BLOCK_SIZE,
            },
        }
    }
}

/// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional)
pub fn parse_hex_color(input: &str) -> Result<Rgba<u8>> {
    let hex = input.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidColor(input.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::InvalidColor(input.to_string()))
    };

    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

/// Format a color as `#RRGGBB`, or `#RRGGBBAA` when translucent
pub fn to_hex_color(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    if a == 255 {
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    } else {
        format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
    }
}

/// Circular brush in source-image pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            radius: DEFAULT_RADIUS,
        }
    }
}

impl Selection {
    /// Clamp the radius to `[20, min(w, h) / 2]`.
    ///
    /// On images smaller than 40px the upper bound wins so the circle
    /// still fits.
    pub fn clamp_radius(&mut self, width: u32, height: u32) {
        let max = width.min(height) as f32 / 2.0;
        self.radius = self.radius.max(MIN_RADIUS).min(max).max(1.0);
    }

    /// Move the center so the whole circle lies inside the image
    pub fn clamp_center(&mut self, width: u32, height: u32) {
        self.center_x = clamp_axis(self.center_x, self.radius, width as f32);
        self.center_y = clamp_axis(self.center_y, self.radius, height as f32);
    }

    /// Apply both clamps, radius first since the center bounds depend on it
    pub fn fit_to(&mut self, width: u32, height: u32) {
        self.clamp_radius(width, height);
        self.clamp_center(width, height);
    }

    /// Change the radius by `steps` wheel notches
    pub fn scroll(&mut self, steps: f32, width: u32, height: u32) {
        self.radius += RADIUS_STEP * steps;
        self.fit_to(width, height);
    }

    /// Integer center and radius for rasterisation.
    ///
    /// Floored so a clamped circle never rasterises past the image edge.
    pub fn to_pixels(&self) -> ((i32, i32), i32) {
        (
            (self.center_x.floor() as i32, self.center_y.floor() as i32),
            self.radius.floor().max(1.0) as i32,
        )
    }
}

fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    if 2.0 * radius >= extent {
        extent / 2.0
    } else {
        value.clamp(radius, extent - radius)
    }
}
