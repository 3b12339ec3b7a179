//! Message handlers for the viewport.
//!
//! Each handler processes one category of messages against the piece of
//! state it owns, keeping the controller's update function small.

use crate::message::{MouseButton, PointerMessage, WindowMessage};
use crate::model::WindowSettings;
use crate::viewport::ViewportTransform;

/// Handle the pan and zoom part of pointer input.
///
/// The secondary button drives the pan gesture and the wheel zooms at the
/// cursor. Returns true if the view changed.
pub fn handle_pan_zoom(msg: PointerMessage, transform: &mut ViewportTransform) -> bool {
    match msg {
        PointerMessage::Pressed {
            button: MouseButton::Secondary,
            x,
            y,
        } => {
            transform.begin_pan(x, y);
            log::debug!("Pan drag started at ({}, {})", x, y);
            false
        }
        PointerMessage::Moved { x, y } if transform.is_panning() => {
            let before = *transform.viewport();
            transform.pan_to(x, y);
            *transform.viewport() != before
        }
        PointerMessage::Released {
            button: MouseButton::Secondary,
            ..
        } => {
            if transform.is_panning() {
                transform.end_pan();
                let vp = transform.viewport();
                log::debug!("Pan drag ended at offset ({}, {})", vp.offset_x, vp.offset_y);
            }
            false
        }
        PointerMessage::Wheel { delta, x, y } => transform.apply_zoom(delta, x, y),
        _ => false,
    }
}

/// Handle window width/level control messages.
///
/// Returns true if the current frame should be fetched again.
pub fn handle_window(msg: WindowMessage, settings: &mut WindowSettings) -> bool {
    match msg {
        WindowMessage::PresetSelected(preset) => {
            settings.select_preset(preset);
            log::debug!(
                "Window preset: {} ({}/{})",
                preset.name(),
                settings.width_text(),
                settings.level_text()
            );
            false
        }
        WindowMessage::WidthEdited(text) => {
            if !settings.set_width_text(text) {
                log::debug!("Window width is read-only under {}", settings.preset().name());
            }
            false
        }
        WindowMessage::LevelEdited(text) => {
            if !settings.set_level_text(text) {
                log::debug!("Window level is read-only under {}", settings.preset().name());
            }
            false
        }
        WindowMessage::Apply => true,
    }
}
