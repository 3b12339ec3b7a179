//! Zoom-to-cursor and clamped panning for the displayed frame.
//!
//! The viewport keeps one invariant on every mutation: along an axis where the
//! scaled image is smaller than the display surface the image is centered,
//! otherwise the offset is clamped so the image covers the surface.

use crate::constants::zoom;
use crate::coords::ImageExtent;

/// Zoom factor and the screen position of the scaled image's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: zoom::DEFAULT,
            offset_x: 0,
            offset_y: 0,
        }
    }
}

/// Pan drag interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanDragState {
    /// Not dragging
    #[default]
    Idle,
    /// Dragging; offsets are computed from where the gesture began, not
    /// accumulated per event, so repeated moves cannot drift.
    Dragging {
        start_pointer: (i32, i32),
        start_offset: (i32, i32),
    },
}

impl PanDragState {
    /// Check if currently dragging
    pub fn is_dragging(&self) -> bool {
        matches!(self, PanDragState::Dragging { .. })
    }
}

/// Move `current` one wheel step in the direction of `delta`, clamped to the
/// zoom bounds. Results are snapped to the step grid.
pub fn step_zoom(current: f32, delta: i32) -> f32 {
    let steps = (current / zoom::STEP).round() as i32 + delta.signum();
    (steps as f32 * zoom::STEP).clamp(zoom::MIN, zoom::MAX)
}

fn clamp_axis(offset: i32, surface: u32, scaled: u32) -> i32 {
    let surface = surface as i32;
    let scaled = scaled as i32;
    if scaled < surface {
        (surface - scaled) / 2
    } else {
        offset.clamp(surface - scaled, 0)
    }
}

/// Owns the zoom and offset for the displayed frame.
#[derive(Debug, Clone)]
pub struct ViewportTransform {
    viewport: Viewport,
    /// Display surface size (width, height)
    surface: (u32, u32),
    /// Natural size of the displayed frame, if any
    image: Option<(u32, u32)>,
    drag: PanDragState,
}

impl ViewportTransform {
    /// Create a transform for a display surface with no frame loaded.
    pub fn new(surface_width: u32, surface_height: u32) -> Self {
        Self {
            viewport: Viewport::default(),
            surface: (surface_width, surface_height),
            image: None,
            drag: PanDragState::Idle,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn zoom(&self) -> f32 {
        self.viewport.zoom
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    /// Natural and scaled size of the displayed frame at the current zoom.
    pub fn extent(&self) -> Option<ImageExtent> {
        self.image
            .map(|(w, h)| ImageExtent::at_zoom(w, h, self.viewport.zoom))
    }

    pub fn is_panning(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Zoom back to 1.0 and center a newly displayed frame of the given size.
    pub fn reset_for_new_frame(&mut self, width: u32, height: u32) {
        self.image = Some((width, height));
        self.drag = PanDragState::Idle;
        self.viewport.zoom = zoom::DEFAULT;

        let extent = ImageExtent::at_zoom(width, height, zoom::DEFAULT);
        self.viewport.offset_x = (self.surface.0 as i32 - extent.scaled_width as i32) / 2;
        self.viewport.offset_y = (self.surface.1 as i32 - extent.scaled_height as i32) / 2;
        self.clamp_offsets();
        log::debug!(
            "Viewport reset for {}x{} frame: offset ({}, {})",
            width,
            height,
            self.viewport.offset_x,
            self.viewport.offset_y
        );
    }

    /// Forget the displayed frame. Pointer mapping and zoom are inert until
    /// the next [`reset_for_new_frame`](Self::reset_for_new_frame).
    pub fn clear(&mut self) {
        self.image = None;
        self.drag = PanDragState::Idle;
        self.viewport = Viewport::default();
    }

    /// Change the display surface size and re-apply the offset invariant.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface = (width, height);
        self.clamp_offsets();
    }

    /// Zoom one step in the direction of `delta`, keeping the image point
    /// under the cursor at the same screen position.
    ///
    /// Returns false if nothing is displayed or the zoom is already at its bound.
    pub fn apply_zoom(&mut self, delta: i32, cursor_x: i32, cursor_y: i32) -> bool {
        if self.image.is_none() || delta == 0 {
            return false;
        }
        let old_zoom = self.viewport.zoom;
        let new_zoom = step_zoom(old_zoom, delta);
        if new_zoom == old_zoom {
            return false;
        }

        // Image-space point under cursor (before zoom)
        let img_x = (cursor_x - self.viewport.offset_x) as f32 / old_zoom;
        let img_y = (cursor_y - self.viewport.offset_y) as f32 / old_zoom;

        // New offset that puts the same point back under the cursor
        self.viewport.zoom = new_zoom;
        self.viewport.offset_x = (cursor_x as f32 - img_x * new_zoom).round() as i32;
        self.viewport.offset_y = (cursor_y as f32 - img_y * new_zoom).round() as i32;
        self.clamp_offsets();

        log::debug!(
            "Zoom {:.1} -> {:.1} at ({}, {}), offset ({}, {})",
            old_zoom,
            new_zoom,
            cursor_x,
            cursor_y,
            self.viewport.offset_x,
            self.viewport.offset_y
        );
        true
    }

    /// Start a pan gesture at the given pointer position.
    pub fn begin_pan(&mut self, pointer_x: i32, pointer_y: i32) {
        self.drag = PanDragState::Dragging {
            start_pointer: (pointer_x, pointer_y),
            start_offset: (self.viewport.offset_x, self.viewport.offset_y),
        };
    }

    /// Continue the pan gesture with the pointer at the given position.
    /// Returns false if no gesture is active.
    pub fn pan_to(&mut self, pointer_x: i32, pointer_y: i32) -> bool {
        let PanDragState::Dragging { start_pointer, .. } = self.drag else {
            return false;
        };
        self.apply_pan(pointer_x - start_pointer.0, pointer_y - start_pointer.1);
        true
    }

    /// Offset the image by `(dx, dy)` relative to where the current gesture
    /// began (or to the current offset when no gesture is active), then clamp.
    pub fn apply_pan(&mut self, dx: i32, dy: i32) {
        if self.image.is_none() {
            return;
        }
        let (base_x, base_y) = match self.drag {
            PanDragState::Dragging { start_offset, .. } => start_offset,
            PanDragState::Idle => (self.viewport.offset_x, self.viewport.offset_y),
        };
        self.viewport.offset_x = base_x + dx;
        self.viewport.offset_y = base_y + dy;
        self.clamp_offsets();
    }

    /// Finish the pan gesture.
    pub fn end_pan(&mut self) {
        self.drag = PanDragState::Idle;
    }

    fn clamp_offsets(&mut self) {
        let Some(extent) = self.extent() else {
            return;
        };
        self.viewport.offset_x = clamp_axis(self.viewport.offset_x, self.surface.0, extent.scaled_width);
        self.viewport.offset_y = clamp_axis(self.viewport.offset_y, self.surface.1, extent.scaled_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::screen_to_image;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    /// A transform showing a large frame with the image's top-left at the
    /// surface's top-left.
    fn large_frame_at_origin() -> ViewportTransform {
        let mut t = ViewportTransform::new(780, 520);
        t.reset_for_new_frame(2048, 2048);
        t.viewport.offset_x = 0;
        t.viewport.offset_y = 0;
        t
    }

    fn assert_invariant(t: &ViewportTransform) {
        let extent = t.extent().unwrap();
        let (sw, sh) = t.surface_size();
        let vp = t.viewport();
        for (offset, surface, scaled) in [
            (vp.offset_x, sw as i32, extent.scaled_width as i32),
            (vp.offset_y, sh as i32, extent.scaled_height as i32),
        ] {
            if scaled < surface {
                assert_eq!(offset, (surface - scaled) / 2, "smaller axis must be centered");
            } else {
                assert!(offset <= 0, "offset {offset} reveals space before the image");
                assert!(offset + scaled >= surface, "offset {offset} reveals space after the image");
            }
        }
    }

    #[test]
    fn test_step_zoom_snaps_and_clamps() {
        assert!(approx_eq(step_zoom(1.0, 1), 1.1));
        assert!(approx_eq(step_zoom(1.0, -3), 0.9));
        assert!(approx_eq(step_zoom(0.1, -1), 0.1));
        assert!(approx_eq(step_zoom(10.0, 1), 10.0));

        // Many steps do not accumulate float drift
        let mut z = 1.0;
        for _ in 0..37 {
            z = step_zoom(z, 1);
        }
        assert!(approx_eq(z, 4.7));
    }

    #[test]
    fn test_initial_frame_centered() {
        // 512x512 in 780x520: narrower on both axes, so both are centered
        let mut t = ViewportTransform::new(780, 520);
        t.reset_for_new_frame(512, 512);

        assert_eq!(t.zoom(), 1.0);
        assert_eq!(t.viewport().offset_x, 134);
        assert_eq!(t.viewport().offset_y, 4);
        assert_invariant(&t);
    }

    #[test]
    fn test_large_frame_centered_within_clamp() {
        let mut t = ViewportTransform::new(780, 520);
        t.reset_for_new_frame(1000, 600);

        assert_eq!(t.viewport().offset_x, -110);
        assert_eq!(t.viewport().offset_y, -40);
        assert_invariant(&t);
    }

    #[test]
    fn test_zoom_in_at_cursor_scenario() {
        let mut t = large_frame_at_origin();
        assert!(t.apply_zoom(1, 200, 150));

        assert!(approx_eq(t.zoom(), 1.1));
        assert_eq!(t.viewport().offset_x, -20);
        assert_eq!(t.viewport().offset_y, -15);

        let extent = t.extent().unwrap();
        let p = screen_to_image(200, 150, t.viewport(), &extent).unwrap();
        assert_eq!((p.x, p.y), (200, 150));
    }

    #[test]
    fn test_zoom_keeps_cursor_point() {
        let cursors = [(0, 0), (390, 260), (779, 519), (123, 456)];
        for &(cx, cy) in &cursors {
            let mut t = ViewportTransform::new(780, 520);
            t.reset_for_new_frame(4096, 4096);
            t.apply_pan(-1500, -2000);

            for delta in [1, 1, 1, -1, 1, -1, -1] {
                let before = screen_to_image(cx, cy, t.viewport(), &t.extent().unwrap()).unwrap();
                t.apply_zoom(delta, cx, cy);
                let after = screen_to_image(cx, cy, t.viewport(), &t.extent().unwrap()).unwrap();

                assert!(before.x.abs_diff(after.x) <= 1, "x drifted at {:?}", (cx, cy));
                assert!(before.y.abs_diff(after.y) <= 1, "y drifted at {:?}", (cx, cy));
                assert_invariant(&t);
            }
        }
    }

    #[test]
    fn test_zoom_out_recenters_small_image() {
        let mut t = ViewportTransform::new(780, 520);
        t.reset_for_new_frame(800, 600);
        t.apply_pan(-20, -80);

        // 0.5 zoom makes the image 400x300, smaller than the surface
        for _ in 0..5 {
            t.apply_zoom(-1, 10, 10);
        }
        assert!(approx_eq(t.zoom(), 0.5));
        assert_eq!(t.viewport().offset_x, 190);
        assert_eq!(t.viewport().offset_y, 110);
    }

    #[test]
    fn test_zoom_bounds() {
        let mut t = ViewportTransform::new(100, 100);
        t.reset_for_new_frame(10, 10);
        for _ in 0..200 {
            t.apply_zoom(1, 50, 50);
        }
        assert!(approx_eq(t.zoom(), zoom::MAX));
        assert!(!t.apply_zoom(1, 50, 50));

        for _ in 0..200 {
            t.apply_zoom(-1, 50, 50);
        }
        assert!(approx_eq(t.zoom(), zoom::MIN));
        assert!(!t.apply_zoom(-5, 50, 50));
    }

    #[test]
    fn test_zoom_without_frame_is_noop() {
        let mut t = ViewportTransform::new(780, 520);
        assert!(!t.apply_zoom(1, 10, 10));
        assert_eq!(t.zoom(), 1.0);
    }

    #[test]
    fn test_pan_clamped_on_large_axis() {
        let mut t = large_frame_at_origin();
        t.begin_pan(100, 100);
        assert!(t.pan_to(400, 400));
        // Cannot pull the image right/down past its top-left corner
        assert_eq!(t.viewport().offset_x, 0);
        assert_eq!(t.viewport().offset_y, 0);

        assert!(t.pan_to(-5000, -5000));
        assert_eq!(t.viewport().offset_x, 780 - 2048);
        assert_eq!(t.viewport().offset_y, 520 - 2048);
        t.end_pan();
        assert!(!t.is_panning());
        assert!(!t.pan_to(0, 0));
    }

    #[test]
    fn test_pan_tracks_gesture_start() {
        let mut t = large_frame_at_origin();
        t.apply_pan(-300, -300);
        t.begin_pan(50, 50);

        // Intermediate positions do not accumulate
        for x in [40, 30, 20, 10, 0] {
            t.pan_to(x, 50);
        }
        assert_eq!(t.viewport().offset_x, -350);
        assert_eq!(t.viewport().offset_y, -300);

        t.pan_to(50, 50);
        assert_eq!(t.viewport().offset_x, -300);
    }

    #[test]
    fn test_pan_small_image_recenters() {
        let mut t = ViewportTransform::new(780, 520);
        t.reset_for_new_frame(512, 512);
        t.begin_pan(0, 0);
        t.pan_to(100, -3);
        assert_eq!(t.viewport().offset_x, 134);
        assert_eq!(t.viewport().offset_y, 4);
    }

    #[test]
    fn test_pan_mixed_axes() {
        // Wider than the surface, shorter than it
        let mut t = ViewportTransform::new(780, 520);
        t.reset_for_new_frame(1000, 200);
        t.apply_pan(-1000, 77);
        assert_eq!(t.viewport().offset_x, -220);
        assert_eq!(t.viewport().offset_y, 160);
        assert_invariant(&t);
    }

    #[test]
    fn test_resize_reapplies_invariant() {
        let mut t = ViewportTransform::new(780, 520);
        t.reset_for_new_frame(1000, 600);
        t.apply_pan(-1000, -1000);
        assert_eq!(t.viewport().offset_x, -220);

        t.resize_surface(1200, 700);
        assert_eq!(t.viewport().offset_x, 100);
        assert_eq!(t.viewport().offset_y, 50);
        assert_invariant(&t);
    }

    #[test]
    fn test_reset_restores_zoom() {
        let mut t = large_frame_at_origin();
        t.apply_zoom(1, 10, 10);
        t.begin_pan(0, 0);
        t.reset_for_new_frame(512, 512);

        assert_eq!(t.zoom(), 1.0);
        assert!(!t.is_panning());
        assert_eq!(t.viewport().offset_x, 134);
    }

    #[test]
    fn test_clear_makes_zoom_inert() {
        let mut t = large_frame_at_origin();
        t.apply_zoom(1, 10, 10);
        t.begin_pan(0, 0);
        t.clear();

        assert!(t.extent().is_none());
        assert!(!t.is_panning());
        assert_eq!(*t.viewport(), Viewport::default());
        assert!(!t.apply_zoom(1, 10, 10));
        assert_eq!(t.zoom(), 1.0);
    }
}
