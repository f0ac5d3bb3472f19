//! Configurable key assignments for the sandbox controls

use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

use super::keycode_serde::{deserialize_keycode, keycode_to_string, serialize_keycode};

/// Keyboard bindings for the default `sandbox` context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(
        default = "default_select_air",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub select_air: KeyCode,
    #[serde(
        default = "default_select_sand",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub select_sand: KeyCode,
    #[serde(
        default = "default_select_water",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub select_water: KeyCode,
    #[serde(
        default = "default_select_stone",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub select_stone: KeyCode,
    #[serde(
        default = "default_clear",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub clear: KeyCode,
    #[serde(
        default = "default_toggle_recording",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub toggle_recording: KeyCode,
    #[serde(
        default = "default_toggle_playback",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub toggle_playback: KeyCode,
    #[serde(
        default = "default_brush_smaller",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub brush_smaller: KeyCode,
    #[serde(
        default = "default_brush_larger",
        serialize_with = "serialize_keycode",
        deserialize_with = "deserialize_keycode"
    )]
    pub brush_larger: KeyCode,
}

fn default_select_air() -> KeyCode {
    KeyCode::Digit1
}
fn default_select_sand() -> KeyCode {
    KeyCode::Digit2
}
fn default_select_water() -> KeyCode {
    KeyCode::Digit3
}
fn default_select_stone() -> KeyCode {
    KeyCode::Digit4
}
fn default_clear() -> KeyCode {
    KeyCode::KeyC
}
fn default_toggle_recording() -> KeyCode {
    KeyCode::KeyR
}
fn default_toggle_playback() -> KeyCode {
    KeyCode::KeyP
}
fn default_brush_smaller() -> KeyCode {
    KeyCode::Minus
}
fn default_brush_larger() -> KeyCode {
    KeyCode::Equal
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            select_air: default_select_air(),
            select_sand: default_select_sand(),
            select_water: default_select_water(),
            select_stone: default_select_stone(),
            clear: default_clear(),
            toggle_recording: default_toggle_recording(),
            toggle_playback: default_toggle_playback(),
            brush_smaller: default_brush_smaller(),
            brush_larger: default_brush_larger(),
        }
    }
}

impl KeyBindings {
    /// Every `(setting name, key)` pair, in declaration order
    pub fn entries(&self) -> [(&'static str, KeyCode); 9] {
        [
            ("select_air", self.select_air),
            ("select_sand", self.select_sand),
            ("select_water", self.select_water),
            ("select_stone", self.select_stone),
            ("clear", self.clear),
            ("toggle_recording", self.toggle_recording),
            ("toggle_playback", self.toggle_playback),
            ("brush_smaller", self.brush_smaller),
            ("brush_larger", self.brush_larger),
        ]
    }

    /// Display name of the key bound to `setting`
    pub fn key_name(&self, setting: &str) -> Option<&'static str> {
        self.entries()
            .into_iter()
            .find(|(name, _)| *name == setting)
            .map(|(_, key)| keycode_to_string(key))
    }
}

/// Input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Window pixels per grid cell (default: 4)
    #[serde(default = "default_world_scale")]
    pub world_scale: u32,

    #[serde(default)]
    pub bindings: KeyBindings,
}

fn default_world_scale() -> u32 {
    4
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            world_scale: default_world_scale(),
            bindings: KeyBindings::default(),
        }
    }
}
