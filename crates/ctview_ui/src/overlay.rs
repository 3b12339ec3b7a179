//! Overlay shapes for drawing on top of the displayed frame.
//!
//! All coordinates are in display-surface pixels. Shapes may lie partially
//! or completely outside the surface; the compositor clips them.

use crate::Color;

/// Stroke width used when an item does not set one.
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;

/// A shape that can be drawn as an overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    /// A filled axis-aligned square centered on a point.
    Square {
        /// Center X in surface space
        cx: f32,
        /// Center Y in surface space
        cy: f32,
        /// Side length in surface pixels
        size: f32,
    },
    /// A filled circle.
    Dot {
        /// Center X in surface space
        cx: f32,
        /// Center Y in surface space
        cy: f32,
        /// Radius in surface pixels
        radius: f32,
    },
    /// A line segment.
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    /// A connected sequence of segments, optionally closed.
    Polyline {
        /// Points in drawing order
        points: Vec<(f32, f32)>,
        /// Whether the last point connects back to the first
        closed: bool,
    },
}

/// An overlay item with shape and styling.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem {
    /// The shape to draw
    pub shape: OverlayShape,
    /// Fill color for squares and dots, stroke color for lines
    pub color: Color,
    /// Stroke width for lines and polylines
    pub stroke_width: f32,
}

impl OverlayItem {
    /// Create a new overlay item with the default stroke width.
    pub fn new(shape: OverlayShape, color: Color) -> Self {
        Self {
            shape,
            color,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }

    /// Override the stroke width.
    pub fn stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = width;
        self
    }
}

/// A collection of overlay items, drawn in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Items to render
    pub items: Vec<OverlayItem>,
}

impl Overlay {
    /// Create a new empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the overlay.
    pub fn push(&mut self, item: OverlayItem) {
        self.items.push(item);
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the overlay is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
