//! Scripted sessions for the headless driver.
//!
//! A script is a JSON array of UI events, e.g.
//!
//! ```json
//! [
//!   { "event": "tool", "tool": "ruler" },
//!   { "event": "click", "x": 234, "y": 104 },
//!   { "event": "next" },
//!   { "event": "click", "x": 434, "y": 404 }
//! ]
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::controller::StatusMessage;
use crate::message::{
    Message, MouseButton, NavigationMessage, PointerMessage, ToolMessage, WindowMessage,
};
use crate::model::{Tool, WindowPreset};
use crate::runtime::ViewerRuntime;

/// One scripted user action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Primary-button click
    Click { x: i32, y: i32 },
    /// Pointer move without buttons
    Move { x: i32, y: i32 },
    /// Secondary-button drag from one point to another
    Pan { from: (i32, i32), to: (i32, i32) },
    /// Wheel ticks at a position; positive zooms in
    Wheel { delta: i32, x: i32, y: i32 },
    Tool { tool: Tool },
    CompletePolygon,
    GoTo { index: usize },
    FrameNumber { text: String },
    Next,
    Previous,
    Preset { preset: WindowPreset },
    WindowWidth { text: String },
    WindowLevel { text: String },
    ApplyWindow,
    Resize { width: u32, height: u32 },
}

impl ScriptStep {
    /// The messages this step produces, in order.
    pub fn messages(&self) -> Vec<Message> {
        match self {
            ScriptStep::Click { x, y } => vec![
                Message::Pointer(PointerMessage::Pressed {
                    button: MouseButton::Primary,
                    x: *x,
                    y: *y,
                }),
                Message::Pointer(PointerMessage::Released {
                    button: MouseButton::Primary,
                    x: *x,
                    y: *y,
                }),
            ],
            ScriptStep::Move { x, y } => vec![Message::Pointer(PointerMessage::Moved { x: *x, y: *y })],
            ScriptStep::Pan { from, to } => vec![
                Message::Pointer(PointerMessage::Pressed {
                    button: MouseButton::Secondary,
                    x: from.0,
                    y: from.1,
                }),
                Message::Pointer(PointerMessage::Moved { x: to.0, y: to.1 }),
                Message::Pointer(PointerMessage::Released {
                    button: MouseButton::Secondary,
                    x: to.0,
                    y: to.1,
                }),
            ],
            ScriptStep::Wheel { delta, x, y } => {
                // One message per tick so each applies a single zoom step
                let tick = delta.signum();
                (0..delta.unsigned_abs())
                    .map(|_| {
                        Message::Pointer(PointerMessage::Wheel {
                            delta: tick,
                            x: *x,
                            y: *y,
                        })
                    })
                    .collect()
            }
            ScriptStep::Tool { tool } => vec![Message::Tool(ToolMessage::Select(*tool))],
            ScriptStep::CompletePolygon => vec![Message::Tool(ToolMessage::CompletePolygon)],
            ScriptStep::GoTo { index } => {
                vec![Message::Navigation(NavigationMessage::GoTo(*index))]
            }
            ScriptStep::FrameNumber { text } => vec![Message::Navigation(
                NavigationMessage::FrameNumberEntered(text.clone()),
            )],
            ScriptStep::Next => vec![Message::Navigation(NavigationMessage::Next)],
            ScriptStep::Previous => vec![Message::Navigation(NavigationMessage::Previous)],
            ScriptStep::Preset { preset } => {
                vec![Message::Window(WindowMessage::PresetSelected(*preset))]
            }
            ScriptStep::WindowWidth { text } => {
                vec![Message::Window(WindowMessage::WidthEdited(text.clone()))]
            }
            ScriptStep::WindowLevel { text } => {
                vec![Message::Window(WindowMessage::LevelEdited(text.clone()))]
            }
            ScriptStep::ApplyWindow => vec![Message::Window(WindowMessage::Apply)],
            ScriptStep::Resize { width, height } => vec![Message::SurfaceResized {
                width: *width,
                height: *height,
            }],
        }
    }
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptStep>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Play `steps` through the runtime, letting outstanding requests finish
/// after each step. Returns every status message shown along the way.
pub fn run_script(
    runtime: &mut ViewerRuntime,
    steps: &[ScriptStep],
    timeout: Duration,
) -> Vec<StatusMessage> {
    let mut transcript = Vec::new();
    let mut last = runtime.controller().status().cloned();

    for (i, step) in steps.iter().enumerate() {
        log::debug!("Step {}: {:?}", i + 1, step);
        for message in step.messages() {
            runtime.dispatch(message);
        }
        if !runtime.settle(timeout) {
            log::warn!("Step {} left requests unanswered", i + 1);
        }

        let status = runtime.controller().status().cloned();
        if status != last {
            if let Some(s) = &status {
                transcript.push(s.clone());
            }
            last = status;
        }
    }
    transcript
}
