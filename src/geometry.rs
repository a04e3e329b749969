//! Mapping between canvas (display) space and source-image pixel space
//!
//! The image is scaled to fit the canvas with its aspect ratio preserved
//! and centered, leaving letterbox bars on one axis. Everything the
//! session stores is in source pixels; only the view deals in display
//! coordinates.

/// A fitted image placement inside a canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Source pixels per display pixel
    pub scale: f32,
    /// Left edge of the displayed image inside the canvas
    pub offset_x: f32,
    /// Top edge of the displayed image inside the canvas
    pub offset_y: f32,
    pub display_width: f32,
    pub display_height: f32,
}

impl Viewport {
    /// Fit an image of `image_width x image_height` into a canvas.
    ///
    /// Returns `None` until both sizes are non-zero (the canvas has not
    /// been laid out yet, or no image is loaded).
    pub fn fit(canvas_width: f32, canvas_height: f32, image_width: u32, image_height: u32) -> Option<Self> {
        if canvas_width <= 0.0 || canvas_height <= 0.0 || image_width == 0 || image_height == 0 {
            return None;
        }

        let (w, h) = (image_width as f32, image_height as f32);
        let aspect = w / h;

        let (display_width, display_height) = if w / canvas_width > h / canvas_height {
            // Wider than the canvas: full width, bars above and below
            (canvas_width, canvas_width / aspect)
        } else {
            (canvas_height * aspect, canvas_height)
        };

        Some(Viewport {
            scale: w / display_width,
            offset_x: (canvas_width - display_width) / 2.0,
            offset_y: (canvas_height - display_height) / 2.0,
            display_width,
            display_height,
        })
    }

    /// Display point to source pixel coordinates
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.offset_x) * self.scale, (y - self.offset_y) * self.scale)
    }

    /// Source pixel coordinates to display point
    pub fn to_display(&self, x: f32, y: f32) -> (f32, f32) {
        (x / self.scale + self.offset_x, y / self.scale + self.offset_y)
    }

    /// Length in source pixels drawn on screen
    pub fn display_length(&self, source_length: f32) -> f32 {
        source_length / self.scale
    }
}
