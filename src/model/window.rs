//! Window width/level presets and the editable window settings.
//!
//! The preset shown to the user is always derived from state: editing either
//! numeric field re-resolves it with [`resolve_preset`], and picking a named
//! preset writes its values into the fields.

use serde::{Deserialize, Serialize};

/// Window width/level pair passed to the preview renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowLevel {
    /// Window width
    pub width: i32,
    /// Window level (center)
    pub level: i32,
}

impl WindowLevel {
    pub const fn new(width: i32, level: i32) -> Self {
        Self { width, level }
    }
}

/// Named window presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowPreset {
    #[default]
    SoftTissue,
    Bone,
    Lung,
    /// User-entered values
    Custom,
}

const PRESET_TABLE: &[(WindowPreset, WindowLevel)] = &[
    (WindowPreset::SoftTissue, WindowLevel::new(350, 40)),
    (WindowPreset::Bone, WindowLevel::new(2000, 400)),
    (WindowPreset::Lung, WindowLevel::new(1500, -600)),
];

impl WindowPreset {
    /// Get the display name for this preset.
    pub fn name(&self) -> &'static str {
        match self {
            WindowPreset::SoftTissue => "Soft tissue",
            WindowPreset::Bone => "Bone",
            WindowPreset::Lung => "Lung",
            WindowPreset::Custom => "Custom",
        }
    }

    /// Get all presets in display order.
    pub fn all() -> &'static [WindowPreset] {
        &[
            WindowPreset::SoftTissue,
            WindowPreset::Bone,
            WindowPreset::Lung,
            WindowPreset::Custom,
        ]
    }

    /// The fixed window for a named preset, `None` for `Custom`.
    pub fn window(&self) -> Option<WindowLevel> {
        PRESET_TABLE
            .iter()
            .find(|(preset, _)| preset == self)
            .map(|(_, window)| *window)
    }
}

/// Resolve which preset matches the entered values.
///
/// Missing (non-numeric) values resolve to `Custom`, as do values that match
/// no named preset exactly.
pub fn resolve_preset(width: Option<i32>, level: Option<i32>) -> WindowPreset {
    let (Some(width), Some(level)) = (width, level) else {
        return WindowPreset::Custom;
    };
    let entered = WindowLevel::new(width, level);
    PRESET_TABLE
        .iter()
        .find(|(_, window)| *window == entered)
        .map(|(preset, _)| *preset)
        .unwrap_or(WindowPreset::Custom)
}

fn parse_field(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}

/// The window width/level input fields and the preset selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSettings {
    width_text: String,
    level_text: String,
    preset: WindowPreset,
}

impl WindowSettings {
    /// Create settings showing the given preset.
    pub fn new(preset: WindowPreset) -> Self {
        let mut settings = Self {
            width_text: String::new(),
            level_text: String::new(),
            preset: WindowPreset::Custom,
        };
        settings.select_preset(preset);
        settings
    }

    /// The preset currently shown in the selector.
    pub fn preset(&self) -> WindowPreset {
        self.preset
    }

    pub fn width_text(&self) -> &str {
        &self.width_text
    }

    pub fn level_text(&self) -> &str {
        &self.level_text
    }

    /// The numeric fields accept edits only while the preset is `Custom`.
    pub fn is_read_only(&self) -> bool {
        self.preset != WindowPreset::Custom
    }

    /// Pick a preset from the selector. Named presets overwrite the fields;
    /// `Custom` keeps them and unlocks editing.
    pub fn select_preset(&mut self, preset: WindowPreset) {
        if let Some(window) = preset.window() {
            self.width_text = window.width.to_string();
            self.level_text = window.level.to_string();
        }
        self.preset = preset;
    }

    /// Edit the width field. Returns false if the field is read-only.
    pub fn set_width_text(&mut self, text: impl Into<String>) -> bool {
        if self.is_read_only() {
            return false;
        }
        self.width_text = text.into();
        self.refresh_preset();
        true
    }

    /// Edit the level field. Returns false if the field is read-only.
    pub fn set_level_text(&mut self, text: impl Into<String>) -> bool {
        if self.is_read_only() {
            return false;
        }
        self.level_text = text.into();
        self.refresh_preset();
        true
    }

    /// Window parameters for the preview request, if both fields are numeric.
    pub fn window(&self) -> Option<WindowLevel> {
        Some(WindowLevel::new(
            parse_field(&self.width_text)?,
            parse_field(&self.level_text)?,
        ))
    }

    fn refresh_preset(&mut self) {
        self.preset = resolve_preset(parse_field(&self.width_text), parse_field(&self.level_text));
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self::new(WindowPreset::default())
    }
}
