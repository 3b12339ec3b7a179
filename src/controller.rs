//! The viewport controller.
//!
//! Owns every piece of viewer state and applies messages to it. Anything
//! that needs the server comes back out of [`ViewportController::update`] as a
//! [`Command`]; its completion is fed back in as a [`BackendMessage`].

use std::fmt;

use ctview_ui::{ComposeError, Compositor, Pixmap};

use crate::coords::screen_to_image;
use crate::handlers;
use crate::message::{
    BackendMessage, Command, Message, MouseButton, NavigationMessage, PointerMessage, ToolMessage,
};
use crate::model::{ImagePoint, InstanceId, Tool, WindowPreset, WindowSettings};
use crate::render;
use crate::state::{
    AnnotationSession, ClickOutcome, CompleteOutcome, Frame, FrameStore, NavigationError, Series,
    SeriesRef, Ticket, TicketIssuer,
};
use crate::viewport::{Viewport, ViewportTransform};

/// User-facing texts.
pub mod text {
    pub const RULER_FIRST_POINT: &str =
        "First ruler point set. Move to another frame and pick the second.";
    pub const POLYGON_ARMED: &str = "Click to add vertices (at least 3).";
    pub const POLYGON_TOO_FEW: &str = "At least 3 points are required.";
    pub const EMPTY_SERIES: &str = "No instances found in the series.";
    pub const NO_POSITION: &str = "(X: -, Y: -)";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// The message line shown under the viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub severity: Severity,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => f.write_str(&self.text),
            Severity::Warning => write!(f, "warning: {}", self.text),
            Severity::Error => write!(f, "error: {}", self.text),
        }
    }
}

/// Orchestrates the frame store, viewport transform and annotation session.
pub struct ViewportController {
    /// Series requested by the last `OpenSeries`, until its list arrives
    requested_series: Option<SeriesRef>,
    series: Option<Series>,
    frames: FrameStore,
    transform: ViewportTransform,
    session: AnnotationSession,
    window: WindowSettings,
    /// Preview loads; only the latest one is applied
    loads: TicketIssuer,
    loading: Option<Ticket>,
    status: Option<StatusMessage>,
    cursor: Option<ImagePoint>,
    dirty: bool,
}

impl ViewportController {
    /// Create a controller for a display surface of the given size.
    pub fn new(surface_width: u32, surface_height: u32, preset: WindowPreset) -> Self {
        Self {
            requested_series: None,
            series: None,
            frames: FrameStore::new(),
            transform: ViewportTransform::new(surface_width, surface_height),
            session: AnnotationSession::new(),
            window: WindowSettings::new(preset),
            loads: TicketIssuer::new(),
            loading: None,
            status: None,
            cursor: None,
            dirty: true,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        self.transform.viewport()
    }

    pub fn transform(&self) -> &ViewportTransform {
        &self.transform
    }

    pub fn session(&self) -> &AnnotationSession {
        &self.session
    }

    pub fn window_settings(&self) -> &WindowSettings {
        &self.window
    }

    pub fn series(&self) -> Option<&Series> {
        self.series.as_ref()
    }

    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    /// Id of the frame currently on screen.
    pub fn displayed_frame(&self) -> Option<&InstanceId> {
        self.frames.instance_id()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Check if a preview load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// Image coordinate under the pointer, formatted for the readout.
    pub fn cursor_readout(&self) -> String {
        match self.cursor {
            Some(point) => point.to_string(),
            None => text::NO_POSITION.to_string(),
        }
    }

    /// Check if the scene changed since the last [`Self::clear_dirty`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Compose the current scene at the display surface size.
    pub fn render(&mut self) -> Result<Pixmap, ComposeError> {
        let (width, height) = self.transform.surface_size();
        let compositor = Compositor::new(width, height);
        render::compose_scene(
            &mut self.frames,
            self.transform.viewport(),
            &self.session,
            &compositor,
        )
    }

    /// Apply one message. Returns the backend work it requires.
    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::Pointer(msg) => self.handle_pointer(msg),
            Message::Tool(msg) => self.handle_tool(msg),
            Message::Navigation(msg) => self.handle_navigation(msg),
            Message::Window(msg) => {
                self.dirty = true;
                if handlers::handle_window(msg, &mut self.window) {
                    self.reload_current()
                } else {
                    Vec::new()
                }
            }
            Message::SurfaceResized { width, height } => {
                self.transform.resize_surface(width, height);
                log::debug!("Surface resized to {}x{}", width, height);
                self.dirty = true;
                Vec::new()
            }
            Message::Backend(msg) => self.handle_backend(msg),
        }
    }

    fn handle_pointer(&mut self, msg: PointerMessage) -> Vec<Command> {
        if handlers::handle_pan_zoom(msg, &mut self.transform) {
            self.dirty = true;
        }
        match msg {
            PointerMessage::Moved { x, y } | PointerMessage::Wheel { x, y, .. } => {
                self.cursor = self.map_pointer(x, y);
                Vec::new()
            }
            PointerMessage::Left => {
                self.cursor = None;
                Vec::new()
            }
            PointerMessage::Pressed {
                button: MouseButton::Primary,
                x,
                y,
            } => self.click(x, y),
            _ => Vec::new(),
        }
    }

    fn map_pointer(&self, x: i32, y: i32) -> Option<ImagePoint> {
        let extent = self.transform.extent()?;
        screen_to_image(x, y, self.transform.viewport(), &extent)
    }

    fn click(&mut self, x: i32, y: i32) -> Vec<Command> {
        let Some(frame) = self.frames.instance_id().cloned() else {
            return Vec::new();
        };
        let Some(point) = self.map_pointer(x, y) else {
            log::trace!("Click at ({}, {}) outside the image", x, y);
            return Vec::new();
        };

        match self.session.click(point, &frame) {
            ClickOutcome::Ignored => Vec::new(),
            ClickOutcome::RulerFirstPlaced => {
                self.dirty = true;
                self.status = Some(StatusMessage::info(text::RULER_FIRST_POINT));
                Vec::new()
            }
            ClickOutcome::VertexAdded(count) => {
                self.dirty = true;
                self.status = Some(StatusMessage::info(format!(
                    "Vertices: {count}. Complete to measure."
                )));
                Vec::new()
            }
            ClickOutcome::Submit(ticket, request) => {
                self.dirty = true;
                vec![Command::Measure { ticket, request }]
            }
        }
    }

    fn handle_tool(&mut self, msg: ToolMessage) -> Vec<Command> {
        match msg {
            ToolMessage::Select(tool) => {
                self.session.select_tool(tool);
                self.dirty = true;
                self.status = match tool {
                    Tool::Polygon => Some(StatusMessage::info(text::POLYGON_ARMED)),
                    Tool::Density | Tool::Ruler => None,
                };
                Vec::new()
            }
            ToolMessage::CompletePolygon => match self.session.complete_polygon() {
                CompleteOutcome::NotCollecting => {
                    log::debug!("Complete ignored: polygon tool not collecting");
                    Vec::new()
                }
                CompleteOutcome::TooFewVertices(count) => {
                    log::debug!("Complete rejected with {} vertices", count);
                    self.status = Some(StatusMessage::warning(text::POLYGON_TOO_FEW));
                    Vec::new()
                }
                CompleteOutcome::Submit(ticket, request) => {
                    self.dirty = true;
                    vec![Command::Measure { ticket, request }]
                }
            },
        }
    }

    fn handle_navigation(&mut self, msg: NavigationMessage) -> Vec<Command> {
        if let NavigationMessage::OpenSeries(reference) = msg {
            log::info!("Opening series {}", reference);
            self.series = None;
            self.frames.clear();
            self.transform.clear();
            self.session.reset();
            self.loads.bump();
            self.loading = None;
            self.cursor = None;
            self.dirty = true;
            self.requested_series = Some(reference.clone());
            return vec![Command::LoadInstances { series: reference }];
        }

        let Some(series) = self.series.as_mut() else {
            log::debug!("Navigation without a series: {:?}", msg);
            return Vec::new();
        };
        let before = series.current_index();
        let target = match msg {
            NavigationMessage::GoTo(index) => series.go_to(index),
            NavigationMessage::FrameNumberEntered(text) => series.go_to_number(&text),
            NavigationMessage::Next => series.step(true),
            NavigationMessage::Previous => series.step(false),
            NavigationMessage::OpenSeries(_) => return Vec::new(),
        };

        match target {
            Ok(instance_id) => {
                let instance_id = instance_id.clone();
                if series.current_index() == before
                    && self.frames.instance_id() == Some(&instance_id)
                {
                    log::debug!("Already showing {}", instance_id);
                    return Vec::new();
                }
                self.request_preview(instance_id)
            }
            Err(NavigationError::InvalidFrameNumber) => {
                self.status = Some(StatusMessage::error(
                    NavigationError::InvalidFrameNumber.to_string(),
                ));
                Vec::new()
            }
            Err(e) => {
                log::warn!("Navigation refused: {}", e);
                Vec::new()
            }
        }
    }

    fn reload_current(&mut self) -> Vec<Command> {
        match self.series.as_ref().and_then(Series::current_id).cloned() {
            Some(instance_id) => self.request_preview(instance_id),
            None => Vec::new(),
        }
    }

    fn request_preview(&mut self, instance_id: InstanceId) -> Vec<Command> {
        let Some(series) = self.series.as_ref() else {
            return Vec::new();
        };
        self.loads.bump();
        let ticket = self.loads.issue();
        self.loading = Some(ticket);
        log::debug!("Requesting preview of {} {}", instance_id, ticket);
        vec![Command::FetchPreview {
            ticket,
            series: series.reference().clone(),
            instance_id,
            window: self.window.window(),
        }]
    }

    fn handle_backend(&mut self, msg: BackendMessage) -> Vec<Command> {
        match msg {
            BackendMessage::InstancesLoaded { series, result } => {
                if self.requested_series.as_ref() != Some(&series) {
                    log::warn!("Discarding instance list of {}: another series was opened", series);
                    return Vec::new();
                }
                self.requested_series = None;
                match result {
                    Ok(ids) => {
                        log::info!("Series {} has {} instances", series, ids.len());
                        let loaded = Series::new(series, ids);
                        let first = loaded.current_id().cloned();
                        self.series = Some(loaded);
                        self.dirty = true;
                        match first {
                            Some(instance_id) => {
                                self.status = None;
                                self.request_preview(instance_id)
                            }
                            None => {
                                self.status = Some(StatusMessage::info(text::EMPTY_SERIES));
                                Vec::new()
                            }
                        }
                    }
                    Err(e) => {
                        log::error!("Failed to load instances of {}: {}", series, e);
                        self.status = Some(StatusMessage::error(format!(
                            "Failed to load the instance list: {e}"
                        )));
                        Vec::new()
                    }
                }
            }
            BackendMessage::PreviewLoaded {
                ticket,
                instance_id,
                result,
            } => {
                if !self.loads.is_current(ticket) {
                    log::warn!("Discarding stale preview of {} {}", instance_id, ticket);
                    return Vec::new();
                }
                self.loading = None;
                match result {
                    Ok(frame) => self.display_frame(frame),
                    Err(e) => {
                        log::error!("Failed to load preview of {}: {}", instance_id, e);
                        self.status = Some(StatusMessage::error(format!(
                            "Failed to load frame preview: {e}"
                        )));
                    }
                }
                Vec::new()
            }
            BackendMessage::MeasurementCompleted {
                ticket,
                kind,
                result,
            } => {
                if !self.session.finish_request(ticket) {
                    log::warn!("Discarding stale {} response {}", kind, ticket);
                    return Vec::new();
                }
                match result {
                    Ok(value) => {
                        log::info!("Measurement {}: {}", ticket, value);
                        self.status = Some(StatusMessage::info(value.to_string()));
                    }
                    Err(e) => {
                        log::error!("Failed to measure {}: {}", kind, e);
                        self.status = Some(StatusMessage::error(format!(
                            "Failed to measure {kind}: {e}"
                        )));
                    }
                }
                Vec::new()
            }
        }
    }

    fn display_frame(&mut self, frame: Frame) {
        let (width, height) = (frame.width(), frame.height());
        log::info!("Displaying {} ({}x{})", frame.instance_id(), width, height);
        drop(self.frames.replace(frame));
        self.transform.reset_for_new_frame(width, height);
        self.session.on_frame_changed();
        self.cursor = None;
        self.dirty = true;
    }
}
