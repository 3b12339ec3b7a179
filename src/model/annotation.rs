//! Annotation tool types and data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MIN_POLYGON_VERTICES;

/// Opaque identifier of one frame (instance) in a series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for InstanceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A pixel position in the frame's native (unscaled) raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: u32,
    pub y: u32,
}

impl ImagePoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for ImagePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(X: {}, Y: {})", self.x, self.y)
    }
}

/// An image point tagged with the frame it was placed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub instance_id: InstanceId,
    pub point: ImagePoint,
}

impl Marker {
    pub fn new(instance_id: InstanceId, point: ImagePoint) -> Self {
        Self { instance_id, point }
    }

    /// Check if this marker belongs to the given frame.
    pub fn is_on(&self, instance_id: &InstanceId) -> bool {
        &self.instance_id == instance_id
    }
}

/// Ruler endpoints. Each endpoint carries its own frame, so the two may
/// belong to different frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulerSegment {
    pub first: Option<Marker>,
    pub second: Option<Marker>,
}

impl RulerSegment {
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.second.is_none()
    }

    pub fn clear(&mut self) {
        self.first = None;
        self.second = None;
    }

    /// Endpoints placed on the given frame.
    pub fn endpoints_on<'a>(&'a self, instance_id: &'a InstanceId) -> impl Iterator<Item = &'a Marker> + 'a {
        self.first
            .iter()
            .chain(self.second.iter())
            .filter(move |m| m.is_on(instance_id))
    }
}

/// Polygon vertices collected on a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolygonDraft {
    /// Frame that was displayed when the first vertex was placed
    pub instance_id: InstanceId,
    /// Vertices in insertion order
    pub vertices: Vec<ImagePoint>,
    /// Set once the polygon has been submitted for measurement
    pub closed: bool,
}

impl PolygonDraft {
    pub fn new(instance_id: InstanceId) -> Self {
        Self {
            instance_id,
            vertices: Vec::new(),
            closed: false,
        }
    }

    /// Check if enough vertices exist to measure an area.
    pub fn is_complete(&self) -> bool {
        self.vertices.len() >= MIN_POLYGON_VERTICES
    }
}

/// Measurement tools that can be armed from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Single-point density probe
    Density,
    /// Two-point distance ruler
    Ruler,
    /// Arbitrary-vertex polygon area
    Polygon,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Density => "HU",
            Tool::Ruler => "Ruler",
            Tool::Polygon => "Area",
        }
    }

    /// Get all available tools.
    pub fn all() -> &'static [Tool] {
        &[Tool::Density, Tool::Ruler, Tool::Polygon]
    }

    /// The state a tool starts in when armed.
    pub fn initial_mode(&self) -> AnnotationMode {
        match self {
            Tool::Density => AnnotationMode::Density,
            Tool::Ruler => AnnotationMode::RulerFirst,
            Tool::Polygon => AnnotationMode::PolygonCollecting,
        }
    }
}

/// The annotation state machine's observable states. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationMode {
    /// No tool armed; clicks do nothing
    #[default]
    Idle,
    /// Next in-bounds click places a density probe
    Density,
    /// Next in-bounds click places the first ruler endpoint
    RulerFirst,
    /// Next in-bounds click places the second ruler endpoint
    RulerSecond,
    /// In-bounds clicks append polygon vertices
    PolygonCollecting,
}

impl AnnotationMode {
    /// The tool this mode belongs to, if any.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            AnnotationMode::Idle => None,
            AnnotationMode::Density => Some(Tool::Density),
            AnnotationMode::RulerFirst | AnnotationMode::RulerSecond => Some(Tool::Ruler),
            AnnotationMode::PolygonCollecting => Some(Tool::Polygon),
        }
    }

    /// Check if a tool is armed.
    pub fn is_armed(&self) -> bool {
        !matches!(self, AnnotationMode::Idle)
    }
}
