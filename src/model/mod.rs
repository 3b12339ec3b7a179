//! Data models for the ctview viewport.

mod annotation;
mod measurement;
mod window;

pub use annotation::{
    AnnotationMode, ImagePoint, InstanceId, Marker, PolygonDraft, RulerSegment, Tool,
};
pub use measurement::{MeasurementKind, MeasurementRequest, MeasurementResult};
pub use window::{WindowLevel, WindowPreset, WindowSettings, resolve_preset};
