//! Global constants for the ctview viewport

/// Zoom limits and wheel step.
pub mod zoom {
    /// Zoom change per wheel tick
    pub const STEP: f32 = 0.1;
    /// Smallest allowed zoom factor
    pub const MIN: f32 = 0.1;
    /// Largest allowed zoom factor
    pub const MAX: f32 = 10.0;
    /// Zoom factor applied when a new frame is displayed
    pub const DEFAULT: f32 = 1.0;
}

/// Display surface defaults.
pub mod surface {
    /// Default display surface width in pixels
    pub const DEFAULT_WIDTH: u32 = 780;
    /// Default display surface height in pixels
    pub const DEFAULT_HEIGHT: u32 = 520;
}

/// Marker styling, in display-surface pixels.
pub mod marker {
    /// Side of the square drawn for density and ruler points
    pub const SQUARE_SIZE: f32 = 10.0;
    /// Radius of polygon vertex dots
    pub const VERTEX_RADIUS: f32 = 4.0;
    /// Width of polygon edges and the ruler line
    pub const LINE_WIDTH: f32 = 2.0;
}

/// Minimum number of vertices for an area measurement.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Default request timeout for the measurement backend, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
