//! Screen-space / image-space coordinate mapping.
//!
//! Pure functions over the current viewport transform. Screen coordinates are
//! integer pixels on the display surface; image coordinates are pixels of the
//! frame's native raster.

use crate::model::ImagePoint;
use crate::viewport::Viewport;

/// Natural and scaled dimensions of the displayed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageExtent {
    /// Natural frame width
    pub width: u32,
    /// Natural frame height
    pub height: u32,
    /// `round(width * zoom)`, at least 1
    pub scaled_width: u32,
    /// `round(height * zoom)`, at least 1
    pub scaled_height: u32,
}

impl ImageExtent {
    /// Compute the extent of a `width`x`height` frame drawn at `zoom`.
    pub fn at_zoom(width: u32, height: u32, zoom: f32) -> Self {
        Self {
            width,
            height,
            scaled_width: scaled_length(width, zoom),
            scaled_height: scaled_length(height, zoom),
        }
    }
}

/// Length of one axis after scaling, rounded and kept at least one pixel.
pub fn scaled_length(length: u32, zoom: f32) -> u32 {
    ((length as f32 * zoom).round() as u32).max(1)
}

/// Map a screen point to the image pixel under it.
///
/// Returns `None` if the point is outside
/// `[offset_x, offset_x + scaled_width) x [offset_y, offset_y + scaled_height)`.
pub fn screen_to_image(
    screen_x: i32,
    screen_y: i32,
    viewport: &Viewport,
    extent: &ImageExtent,
) -> Option<ImagePoint> {
    let rel_x = screen_x - viewport.offset_x;
    let rel_y = screen_y - viewport.offset_y;
    if rel_x < 0 || rel_y < 0 || rel_x >= extent.scaled_width as i32 || rel_y >= extent.scaled_height as i32 {
        return None;
    }

    // Clamp absorbs rounding at the far edge
    let x = (rel_x as f32 / viewport.zoom).floor() as i64;
    let y = (rel_y as f32 / viewport.zoom).floor() as i64;
    Some(ImagePoint::new(
        x.clamp(0, extent.width.saturating_sub(1) as i64) as u32,
        y.clamp(0, extent.height.saturating_sub(1) as i64) as u32,
    ))
}

/// Map an image pixel to its screen position. No clamping: the result may lie
/// outside the display surface when the image is partially scrolled off.
pub fn image_to_screen(point: ImagePoint, viewport: &Viewport) -> (f32, f32) {
    (
        viewport.offset_x as f32 + point.x as f32 * viewport.zoom,
        viewport.offset_y as f32 + point.y as f32 * viewport.zoom,
    )
}
