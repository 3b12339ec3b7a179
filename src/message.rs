//! Message types driving the viewer.
//!
//! UI events and backend completions are represented as messages in the Elm
//! architecture style. Side effects the controller wants performed come back
//! out as [`Command`]s.

use crate::api::ApiError;
use crate::model::{
    InstanceId, MeasurementKind, MeasurementRequest, MeasurementResult, Tool, WindowLevel,
    WindowPreset,
};
use crate::state::{Frame, SeriesRef, Ticket};

/// Messages that can be sent to update viewer state.
#[derive(Debug)]
pub enum Message {
    /// Pointer and wheel input on the display surface
    Pointer(PointerMessage),
    /// Toolbar actions
    Tool(ToolMessage),
    /// Frame navigation
    Navigation(NavigationMessage),
    /// Window width/level controls
    Window(WindowMessage),
    /// The display surface changed size
    SurfaceResized { width: u32, height: u32 },
    /// A backend request finished
    Backend(BackendMessage),
}

/// Mouse buttons the viewport distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Tool clicks
    Primary,
    /// Pan gesture
    Secondary,
}

/// Pointer events in display-surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerMessage {
    Pressed { button: MouseButton, x: i32, y: i32 },
    Released { button: MouseButton, x: i32, y: i32 },
    Moved { x: i32, y: i32 },
    /// The pointer left the display surface
    Left,
    /// Wheel turned; positive delta zooms in
    Wheel { delta: i32, x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMessage {
    /// Arm a measurement tool
    Select(Tool),
    /// Close the polygon and request its area
    CompletePolygon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationMessage {
    /// Load the instance list of a series and show its first frame
    OpenSeries(SeriesRef),
    /// Jump to a zero-based frame index (slider)
    GoTo(usize),
    /// Jump to a one-based frame number typed by the user
    FrameNumberEntered(String),
    Next,
    Previous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowMessage {
    PresetSelected(WindowPreset),
    WidthEdited(String),
    LevelEdited(String),
    /// Reload the current frame with the current window values
    Apply,
}

/// Completions of [`Command`]s.
#[derive(Debug)]
pub enum BackendMessage {
    InstancesLoaded {
        series: SeriesRef,
        result: Result<Vec<InstanceId>, ApiError>,
    },
    PreviewLoaded {
        ticket: Ticket,
        instance_id: InstanceId,
        result: Result<Frame, ApiError>,
    },
    MeasurementCompleted {
        ticket: Ticket,
        kind: MeasurementKind,
        result: Result<MeasurementResult, ApiError>,
    },
}

/// Backend work requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadInstances {
        series: SeriesRef,
    },
    FetchPreview {
        ticket: Ticket,
        series: SeriesRef,
        instance_id: InstanceId,
        window: Option<WindowLevel>,
    },
    Measure {
        ticket: Ticket,
        request: MeasurementRequest,
    },
}

impl Command {
    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            Command::LoadInstances { series } => format!("load instances of {series}"),
            Command::FetchPreview {
                ticket, instance_id, ..
            } => format!("fetch preview {instance_id} {ticket}"),
            Command::Measure { ticket, request } => {
                format!("measure {} {ticket}", request.kind())
            }
        }
    }
}
