//! Backend interfaces consumed by the viewer.

use crate::model::{
    ImagePoint, InstanceId, Marker, MeasurementRequest, MeasurementResult, WindowLevel,
};
use crate::state::SeriesRef;

use super::ApiError;

/// The remote measurement service.
///
/// All coordinates are image-space pixels. Every call is idempotent.
pub trait MeasurementClient {
    /// Density in Hounsfield units at one point.
    fn density(&self, instance_id: &InstanceId, point: ImagePoint) -> Result<i32, ApiError>;

    /// Distance in millimetres between two points, possibly on different frames.
    fn distance(&self, first: &Marker, second: &Marker) -> Result<f64, ApiError>;

    /// Area in square millimetres enclosed by the vertices, in order.
    fn area(&self, instance_id: &InstanceId, vertices: &[ImagePoint]) -> Result<f64, ApiError>;

    /// Dispatch a request to the matching operation.
    fn measure(&self, request: &MeasurementRequest) -> Result<MeasurementResult, ApiError> {
        match request {
            MeasurementRequest::Density { instance_id, point } => {
                self.density(instance_id, *point).map(MeasurementResult::Density)
            }
            MeasurementRequest::Distance { first, second } => {
                self.distance(first, second).map(MeasurementResult::Distance)
            }
            MeasurementRequest::Area {
                instance_id,
                vertices,
            } => self.area(instance_id, vertices).map(MeasurementResult::Area),
        }
    }
}

/// Source of instance lists and rendered previews.
pub trait SeriesSource {
    /// Instance ids of a series in display order.
    fn instances(&self, series: &SeriesRef) -> Result<Vec<InstanceId>, ApiError>;

    /// Encoded preview image of one instance. `window` is sent only if given.
    fn preview(
        &self,
        series: &SeriesRef,
        instance_id: &InstanceId,
        window: Option<WindowLevel>,
    ) -> Result<Vec<u8>, ApiError>;
}
