//! ctview_ui - scene composition for the ctview viewport
//!
//! This crate knows how to draw a scaled frame raster and a set of overlay
//! shapes onto a display surface. It has no notion of series, frames,
//! annotation sessions or measurement requests; callers hand it shapes that
//! are already in display-surface coordinates.

mod color;
mod compositor;
mod overlay;

pub use color::Color;
pub use compositor::{ComposeError, Compositor, PlacedRaster, encode_png};
pub use overlay::{Overlay, OverlayItem, OverlayShape};

pub use tiny_skia::Pixmap;
