//! Builds the viewport scene: the scaled frame plus annotation markers.

use ctview_ui::{
    Color, ComposeError, Compositor, Overlay, OverlayItem, OverlayShape, Pixmap, PlacedRaster,
};

use crate::constants::marker;
use crate::coords::image_to_screen;
use crate::model::{ImagePoint, InstanceId};
use crate::state::{AnnotationSession, FrameStore};
use crate::viewport::Viewport;

fn square(point: ImagePoint, viewport: &Viewport, color: Color) -> OverlayItem {
    let (cx, cy) = image_to_screen(point, viewport);
    OverlayItem::new(
        OverlayShape::Square {
            cx,
            cy,
            size: marker::SQUARE_SIZE,
        },
        color,
    )
}

/// Overlay items for the markers that belong to `frame`.
///
/// Markers placed on other frames are kept by the session but not drawn.
pub fn build_overlay(session: &AnnotationSession, frame: &InstanceId, viewport: &Viewport) -> Overlay {
    let mut overlay = Overlay::new();

    if let Some(density) = session.density_marker().filter(|m| m.is_on(frame)) {
        overlay.push(square(density.point, viewport, Color::RED));
    }

    let ruler = session.ruler();
    if let (Some(first), Some(second)) = (&ruler.first, &ruler.second) {
        if first.is_on(frame) && second.is_on(frame) {
            let (x1, y1) = image_to_screen(first.point, viewport);
            let (x2, y2) = image_to_screen(second.point, viewport);
            overlay.push(
                OverlayItem::new(OverlayShape::Line { x1, y1, x2, y2 }, Color::GREEN)
                    .stroke_width(marker::LINE_WIDTH),
            );
        }
    }
    for endpoint in ruler.endpoints_on(frame) {
        overlay.push(square(endpoint.point, viewport, Color::GREEN));
    }

    if let Some(polygon) = session.polygon().filter(|p| &p.instance_id == frame) {
        let points: Vec<(f32, f32)> = polygon
            .vertices
            .iter()
            .map(|&v| image_to_screen(v, viewport))
            .collect();
        if points.len() > 1 {
            overlay.push(
                OverlayItem::new(
                    OverlayShape::Polyline {
                        points: points.clone(),
                        closed: polygon.closed,
                    },
                    Color::ORANGE,
                )
                .stroke_width(marker::LINE_WIDTH),
            );
        }
        for (cx, cy) in points {
            overlay.push(OverlayItem::new(
                OverlayShape::Dot {
                    cx,
                    cy,
                    radius: marker::VERTEX_RADIUS,
                },
                Color::ORANGE,
            ));
        }
    }

    overlay
}

/// Compose the current frame and its markers onto a surface of the
/// compositor's size. Without a frame the surface is just background.
pub fn compose_scene(
    frames: &mut FrameStore,
    viewport: &Viewport,
    session: &AnnotationSession,
    compositor: &Compositor,
) -> Result<Pixmap, ComposeError> {
    let Some(frame_id) = frames.instance_id().cloned() else {
        return compositor.compose(None, &Overlay::new());
    };
    let overlay = build_overlay(session, &frame_id, viewport);

    let scaled = frames.scaled(viewport.zoom);
    let placed = scaled.map(|s| PlacedRaster {
        rgba: s.raster().as_raw(),
        width: s.width(),
        height: s.height(),
        x: viewport.offset_x,
        y: viewport.offset_y,
    });
    compositor.compose(placed.as_ref(), &overlay)
}
