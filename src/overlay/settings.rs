use crate::scene::serialization::{self, SerializationError};
use std::path::Path;

pub const MAX_DISTANCE_LIMIT: f32 = 1000.0;

/// Operator-facing overlay configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Distance budget of the draw-all pass.
    pub max_distance: f32,
    /// Opacity multiplier of the draw-all pass.
    pub alpha: f32,
    pub draw_all: bool,
    pub use_left_click: bool,
    /// Paint hotkey; `None` disables it.
    pub hotkey: Option<char>,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            max_distance: 50.0,
            alpha: 0.25,
            draw_all: false,
            use_left_click: true,
            hotkey: Some('v'),
        }
    }
}

impl OverlaySettings {
    pub fn set_max_distance(&mut self, value: f32) {
        self.max_distance = clamp_or(value, 0.0, MAX_DISTANCE_LIMIT, 0.0);
    }

    pub fn set_alpha(&mut self, value: f32) {
        self.alpha = clamp_or(value, 0.0, 1.0, 0.0);
    }

    /// Clamps values that arrived from a hand-edited file.
    pub fn sanitized(mut self) -> Self {
        self.set_max_distance(self.max_distance);
        self.set_alpha(self.alpha);
        self
    }

    pub fn matches_hotkey(&self, key: char) -> bool {
        self.hotkey
            .map_or(false, |hotkey| hotkey.to_lowercase().eq(key.to_lowercase()))
    }

    pub fn load(path: &Path) -> Result<Self, SerializationError> {
        let settings: Self = serialization::load_json(path)?;
        Ok(settings.sanitized())
    }

    pub fn save(&self, path: &Path) -> Result<(), SerializationError> {
        serialization::save_json(self, path)
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}
