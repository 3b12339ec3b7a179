//! Measurement requests issued by the annotation tools and their results.

use std::fmt;

use super::{ImagePoint, InstanceId, Marker};

/// Which quantity a measurement computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementKind {
    Density,
    Distance,
    Area,
}

impl MeasurementKind {
    /// Get the display name used in user-facing messages.
    pub fn name(&self) -> &'static str {
        match self {
            MeasurementKind::Density => "HU",
            MeasurementKind::Distance => "distance",
            MeasurementKind::Area => "area",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A request for the measurement service. All coordinates are image-space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasurementRequest {
    /// Tissue density at one point of one frame
    Density {
        instance_id: InstanceId,
        point: ImagePoint,
    },
    /// Real-world distance between two points, possibly on different frames
    Distance { first: Marker, second: Marker },
    /// Real-world area enclosed by an ordered polygon on one frame
    Area {
        instance_id: InstanceId,
        vertices: Vec<ImagePoint>,
    },
}

impl MeasurementRequest {
    pub fn kind(&self) -> MeasurementKind {
        match self {
            MeasurementRequest::Density { .. } => MeasurementKind::Density,
            MeasurementRequest::Distance { .. } => MeasurementKind::Distance,
            MeasurementRequest::Area { .. } => MeasurementKind::Area,
        }
    }
}

/// A scalar measurement returned by the service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasurementResult {
    /// Density in Hounsfield units
    Density(i32),
    /// Distance in millimetres
    Distance(f64),
    /// Area in square millimetres
    Area(f64),
}

impl MeasurementResult {
    pub fn kind(&self) -> MeasurementKind {
        match self {
            MeasurementResult::Density(_) => MeasurementKind::Density,
            MeasurementResult::Distance(_) => MeasurementKind::Distance,
            MeasurementResult::Area(_) => MeasurementKind::Area,
        }
    }
}

impl fmt::Display for MeasurementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementResult::Density(hu) => write!(f, "Density at point: {hu} HU"),
            MeasurementResult::Distance(mm) => write!(f, "Distance between points: {mm:.3} mm"),
            MeasurementResult::Area(mm2) => write!(f, "Area: {mm2:.3} mm²"),
        }
    }
}
