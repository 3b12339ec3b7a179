//! Software compositor for the viewport scene.
//!
//! Draws the scaled frame raster at its offset, then every overlay item on
//! top, into a pixmap the size of the display surface. Only the part of the
//! raster that lands on the surface is copied; anything outside is clipped.

use tiny_skia::{FillRule, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform};

use crate::{Color, Overlay, OverlayItem, OverlayShape};

/// Errors that can occur while composing or encoding a scene.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// The display surface has a zero dimension or is too large
    #[error("Invalid surface size {width}x{height}")]
    InvalidSurface { width: u32, height: u32 },

    /// The raster byte length does not match its declared dimensions
    #[error("Raster of {width}x{height} needs {expected} bytes, got {actual}")]
    RasterSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// PNG encoding failed
    #[error("Failed to encode PNG: {0}")]
    Encode(String),
}

/// A straight-alpha RGBA raster placed at an integer offset on the surface.
#[derive(Debug, Clone, Copy)]
pub struct PlacedRaster<'a> {
    /// RGBA8 pixel data, row-major, `width * height * 4` bytes
    pub rgba: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Left edge on the surface (may be negative)
    pub x: i32,
    /// Top edge on the surface (may be negative)
    pub y: i32,
}

/// Composes rasters and overlays onto a fixed-size display surface with a
/// black background.
#[derive(Debug, Clone)]
pub struct Compositor {
    width: u32,
    height: u32,
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Draw the raster (if any) and the overlay into a new pixmap.
    pub fn compose(
        &self,
        raster: Option<&PlacedRaster<'_>>,
        overlay: &Overlay,
    ) -> Result<Pixmap, ComposeError> {
        let mut pixmap = Pixmap::new(self.width, self.height).ok_or(ComposeError::InvalidSurface {
            width: self.width,
            height: self.height,
        })?;
        pixmap.fill(Color::BLACK.to_skia());

        let visible = match raster {
            Some(raster) => visible_pixmap(raster, self.width, self.height)?,
            None => None,
        };
        if let Some((source, x, y)) = visible {
            pixmap.draw_pixmap(
                x,
                y,
                source.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }

        for item in &overlay.items {
            draw_item(&mut pixmap, item);
        }

        log::trace!(
            "Composed {}x{} scene with {} overlay items",
            self.width,
            self.height,
            overlay.len()
        );
        Ok(pixmap)
    }
}

/// Encode a composed scene as PNG bytes.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, ComposeError> {
    pixmap
        .encode_png()
        .map_err(|e| ComposeError::Encode(e.to_string()))
}

/// Copy the part of `raster` that overlaps a `surface_w` x `surface_h`
/// surface into a premultiplied pixmap. Returns the pixmap and its surface
/// position, or `None` when nothing is visible.
fn visible_pixmap(
    raster: &PlacedRaster<'_>,
    surface_w: u32,
    surface_h: u32,
) -> Result<Option<(Pixmap, i32, i32)>, ComposeError> {
    let expected = raster.width as usize * raster.height as usize * 4;
    if raster.rgba.len() != expected {
        return Err(ComposeError::RasterSize {
            width: raster.width,
            height: raster.height,
            expected,
            actual: raster.rgba.len(),
        });
    }

    let left = i64::from(raster.x).max(0);
    let top = i64::from(raster.y).max(0);
    let right = (i64::from(raster.x) + i64::from(raster.width)).min(i64::from(surface_w));
    let bottom = (i64::from(raster.y) + i64::from(raster.height)).min(i64::from(surface_h));
    if right <= left || bottom <= top {
        return Ok(None);
    }

    let cols = (right - left) as usize;
    let rows = (bottom - top) as usize;
    let src_x = (left - i64::from(raster.x)) as usize;
    let src_y = (top - i64::from(raster.y)) as usize;
    let stride = raster.width as usize * 4;

    let mut data = Vec::with_capacity(cols * rows * 4);
    for row in raster.rgba.chunks_exact(stride).skip(src_y).take(rows) {
        data.extend_from_slice(&row[src_x * 4..(src_x + cols) * 4]);
    }

    // tiny-skia stores premultiplied alpha
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a < 255 {
            px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
            px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
            px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
        }
    }

    let size = IntSize::from_wh(cols as u32, rows as u32).ok_or(ComposeError::InvalidSurface {
        width: cols as u32,
        height: rows as u32,
    })?;
    let pixmap = Pixmap::from_vec(data, size).ok_or(ComposeError::RasterSize {
        width: raster.width,
        height: raster.height,
        expected,
        actual: raster.rgba.len(),
    })?;
    Ok(Some((pixmap, left as i32, top as i32)))
}

fn draw_item(pixmap: &mut Pixmap, item: &OverlayItem) {
    let mut paint = Paint::default();
    paint.set_color(item.color.to_skia());

    match &item.shape {
        OverlayShape::Square { cx, cy, size } => {
            let half = size / 2.0;
            paint.anti_alias = false;
            if let Some(rect) = Rect::from_xywh(cx - half, cy - half, *size, *size) {
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }
        OverlayShape::Dot { cx, cy, radius } => {
            paint.anti_alias = true;
            if let Some(path) = PathBuilder::from_circle(*cx, *cy, *radius) {
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
        OverlayShape::Line { x1, y1, x2, y2 } => {
            paint.anti_alias = true;
            let mut pb = PathBuilder::new();
            pb.move_to(*x1, *y1);
            pb.line_to(*x2, *y2);
            if let Some(path) = pb.finish() {
                let stroke = Stroke {
                    width: item.stroke_width,
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
        OverlayShape::Polyline { points, closed } => {
            if points.len() < 2 {
                return;
            }
            paint.anti_alias = true;
            let mut pb = PathBuilder::new();
            pb.move_to(points[0].0, points[0].1);
            for &(x, y) in &points[1..] {
                pb.line_to(x, y);
            }
            if *closed {
                pb.close();
            }
            if let Some(path) = pb.finish() {
                let stroke = Stroke {
                    width: item.stroke_width,
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_at(pixmap: &Pixmap, x: u32, y: u32) -> (u8, u8, u8) {
        let px = pixmap.pixel(x, y).expect("pixel in bounds");
        (px.red(), px.green(), px.blue())
    }

    #[test]
    fn test_empty_scene_is_background() {
        let pixmap = Compositor::new(8, 6).compose(None, &Overlay::new()).unwrap();
        assert_eq!(pixmap.width(), 8);
        assert_eq!(pixmap.height(), 6);
        assert_eq!(rgb_at(&pixmap, 3, 3), (0, 0, 0));
    }

    #[test]
    fn test_zero_surface_rejected() {
        let result = Compositor::new(0, 10).compose(None, &Overlay::new());
        assert!(matches!(result, Err(ComposeError::InvalidSurface { .. })));
    }

    #[test]
    fn test_raster_drawn_at_offset() {
        let rgba = vec![255u8; 2 * 2 * 4];
        let raster = PlacedRaster {
            rgba: &rgba,
            width: 2,
            height: 2,
            x: 1,
            y: 1,
        };
        let pixmap = Compositor::new(4, 4).compose(Some(&raster), &Overlay::new()).unwrap();

        assert_eq!(rgb_at(&pixmap, 0, 0), (0, 0, 0));
        assert_eq!(rgb_at(&pixmap, 1, 1), (255, 255, 255));
        assert_eq!(rgb_at(&pixmap, 2, 2), (255, 255, 255));
        assert_eq!(rgb_at(&pixmap, 3, 3), (0, 0, 0));
    }

    #[test]
    fn test_raster_partially_off_surface() {
        let rgba = vec![255u8; 4 * 4 * 4];
        let raster = PlacedRaster {
            rgba: &rgba,
            width: 4,
            height: 4,
            x: -2,
            y: -2,
        };
        let pixmap = Compositor::new(4, 4).compose(Some(&raster), &Overlay::new()).unwrap();

        assert_eq!(rgb_at(&pixmap, 1, 1), (255, 255, 255));
        assert_eq!(rgb_at(&pixmap, 2, 2), (0, 0, 0));
    }

    #[test]
    fn test_only_visible_part_of_raster_copied() {
        // Each pixel encodes its own source coordinate
        let (w, h) = (20u32, 20u32);
        let mut rgba = Vec::with_capacity((w * h * 4) as usize);
        for y in 0..h {
            for x in 0..w {
                rgba.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        let raster = PlacedRaster {
            rgba: &rgba,
            width: w,
            height: h,
            x: -5,
            y: -3,
        };

        let (visible, x, y) = visible_pixmap(&raster, 4, 4).unwrap().unwrap();
        assert_eq!((visible.width(), visible.height()), (4, 4));
        assert_eq!((x, y), (0, 0));

        let pixmap = Compositor::new(4, 4).compose(Some(&raster), &Overlay::new()).unwrap();
        assert_eq!(rgb_at(&pixmap, 0, 0), (5, 3, 0));
        assert_eq!(rgb_at(&pixmap, 1, 2), (6, 5, 0));
    }

    #[test]
    fn test_raster_off_surface_skipped() {
        let rgba = vec![255u8; 2 * 2 * 4];
        let raster = PlacedRaster {
            rgba: &rgba,
            width: 2,
            height: 2,
            x: 10,
            y: -1,
        };
        assert!(visible_pixmap(&raster, 4, 4).unwrap().is_none());
        let pixmap = Compositor::new(4, 4).compose(Some(&raster), &Overlay::new()).unwrap();
        assert_eq!(rgb_at(&pixmap, 3, 0), (0, 0, 0));
    }

    #[test]
    fn test_raster_size_mismatch() {
        let rgba = vec![0u8; 10];
        let raster = PlacedRaster {
            rgba: &rgba,
            width: 2,
            height: 2,
            x: 0,
            y: 0,
        };
        let result = Compositor::new(4, 4).compose(Some(&raster), &Overlay::new());
        assert!(matches!(
            result,
            Err(ComposeError::RasterSize {
                expected: 16,
                actual: 10,
                ..
            })
        ));
    }

    #[test]
    fn test_square_marker_filled() {
        let mut overlay = Overlay::new();
        overlay.push(OverlayItem::new(
            OverlayShape::Square {
                cx: 10.0,
                cy: 10.0,
                size: 10.0,
            },
            Color::RED,
        ));
        let pixmap = Compositor::new(20, 20).compose(None, &overlay).unwrap();

        assert_eq!(rgb_at(&pixmap, 10, 10), (255, 0, 0));
        assert_eq!(rgb_at(&pixmap, 6, 6), (255, 0, 0));
        assert_eq!(rgb_at(&pixmap, 16, 16), (0, 0, 0));
    }

    #[test]
    fn test_shapes_outside_surface_are_clipped() {
        let mut overlay = Overlay::new();
        overlay.push(OverlayItem::new(
            OverlayShape::Square {
                cx: -50.0,
                cy: -50.0,
                size: 10.0,
            },
            Color::RED,
        ));
        overlay.push(OverlayItem::new(
            OverlayShape::Polyline {
                points: vec![(-10.0, -10.0), (100.0, -10.0), (100.0, 100.0)],
                closed: true,
            },
            Color::ORANGE,
        ));
        let pixmap = Compositor::new(10, 10).compose(None, &overlay).unwrap();
        assert_eq!(pixmap.width(), 10);
    }

    #[test]
    fn test_encode_png_signature() {
        let pixmap = Compositor::new(3, 3).compose(None, &Overlay::new()).unwrap();
        let png = encode_png(&pixmap).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
