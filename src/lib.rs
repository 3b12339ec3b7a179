//! ctview - CT series viewport and measurement annotation
//!
//! Zoom-to-cursor and clamped panning over rendered frames of a series, with
//! density, ruler and polygon-area tools whose image-space coordinates are
//! measured by a remote server.

pub mod api;
pub mod config;
pub mod constants;
pub mod controller;
pub mod coords;
mod handlers;
pub mod message;
pub mod model;
pub mod render;
pub mod replay;
pub mod runtime;
pub mod state;
pub mod viewport;

pub use config::AppConfig;
pub use controller::{Severity, StatusMessage, ViewportController};
pub use runtime::ViewerRuntime;
