//! Circular mask application: solid color fill or mosaic pixelation
//!
//! Both variants share one shape: a grayscale stencil the size of the
//! circle's bounding square, white inside the circle and black outside.
//! Only stencil-white pixels of the working buffer are touched.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::state::data::MaskSpec;

/// Pixel rectangle clipped to the image, in source coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Apply `spec` to the circle `(center, radius)` on `working`.
///
/// `source` is the pristine decoded image and is only read: mosaic
/// always samples from it so repeated passes over the same spot do not
/// compound. Color fills draw on top of whatever `working` already holds.
/// Returns the touched bounding region, or `None` if no image pixel
/// falls inside the circle.
pub fn apply_mask(
    source: &RgbaImage,
    working: &mut RgbaImage,
    center: (i32, i32),
    radius: i32,
    spec: MaskSpec,
) -> Option<Region> {
    debug_assert_eq!(source.dimensions(), working.dimensions());

    let radius = radius.max(1);
    let stencil = circle_stencil(radius);
    let origin = (center.0 - radius, center.1 - radius);
    let region = clip(origin, stencil.width(), working.width(), working.height())?;
    stencil_pixels(&stencil, origin, region).next()?;

    match spec {
        MaskSpec::Color(color) => fill_color(working, &stencil, origin, region, color),
        MaskSpec::Mosaic { block_size } => {
            let patch = pixelate(source, region, block_size);
            composite(working, &stencil, origin, region, |x, y| {
                *patch.get_pixel(x - region.x, y - region.y)
            });
        }
    }

    Some(region)
}

/// White-inside-circle stencil of size `2r + 1`
fn circle_stencil(radius: i32) -> GrayImage {
    let size = (2 * radius + 1) as u32;
    let mut stencil = GrayImage::new(size, size);
    draw_filled_circle_mut(&mut stencil, (radius, radius), radius, Luma([255]));
    stencil
}

/// Intersect the square at `origin` with the image bounds
fn clip(origin: (i32, i32), size: u32, width: u32, height: u32) -> Option<Region> {
    let x0 = origin.0.max(0) as i64;
    let y0 = origin.1.max(0) as i64;
    let x1 = (origin.0 as i64 + size as i64).min(width as i64);
    let y1 = (origin.1 as i64 + size as i64).min(height as i64);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Region {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}

/// Crop `region` from the source and pixelate it with nearest-neighbour
/// down/up sampling
fn pixelate(source: &RgbaImage, region: Region, block_size: u32) -> RgbaImage {
    let block = block_size.max(1);
    let crop = imageops::crop_imm(source, region.x, region.y, region.width, region.height).to_image();

    let small_w = (region.width / block).max(1);
    let small_h = (region.height / block).max(1);
    let small = imageops::resize(&crop, small_w, small_h, FilterType::Nearest);
    imageops::resize(&small, region.width, region.height, FilterType::Nearest)
}

fn fill_color(working: &mut RgbaImage, stencil: &GrayImage, origin: (i32, i32), region: Region, color: Rgba<u8>) {
    if color[3] == 255 {
        composite(working, stencil, origin, region, |_, _| color);
        return;
    }

    // Blending never makes a pixel more transparent than it was
    for (x, y) in stencil_pixels(stencil, origin, region) {
        let pixel = working.get_pixel_mut(x, y);
        let alpha = pixel[3];
        pixel.blend(&color);
        pixel[3] = pixel[3].max(alpha);
    }
}

/// Replace every stencil-covered pixel in `region` with `pixel_at(x, y)`
fn composite<F>(working: &mut RgbaImage, stencil: &GrayImage, origin: (i32, i32), region: Region, pixel_at: F)
where
    F: Fn(u32, u32) -> Rgba<u8>,
{
    for (x, y) in stencil_pixels(stencil, origin, region) {
        working.put_pixel(x, y, pixel_at(x, y));
    }
}

/// Image coordinates inside `region` whose stencil value is non-zero
fn stencil_pixels<'a>(
    stencil: &'a GrayImage,
    origin: (i32, i32),
    region: Region,
) -> impl Iterator<Item = (u32, u32)> + 'a {
    (region.y..region.y + region.height).flat_map(move |y| {
        (region.x..region.x + region.width).filter_map(move |x| {
            let sx = (x as i64 - origin.0 as i64) as u32;
            let sy = (y as i64 - origin.1 as i64) as u32;
            (stencil.get_pixel(sx, sy)[0] > 0).then_some((x, y))
        })
    })
}
