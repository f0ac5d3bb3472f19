//! Tool state shared by bindings and command effects

use funhouse_shared::Material;

use crate::config::SandboxConfig;

pub const MIN_BRUSH_SIZE: i32 = 1;
pub const MAX_BRUSH_SIZE: i32 = 50;
/// Brush size change per key press
pub const BRUSH_STEP: i32 = 2;
pub const DEFAULT_BRUSH_SIZE: i32 = 5;

/// Selected material and brush size.
///
/// Passed explicitly to binding factories and command effects; nothing holds
/// on to it between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxState {
    pub selected_material: Material,
    pub brush_size: i32,
}

impl Default for SandboxState {
    fn default() -> Self {
        Self {
            selected_material: Material::Sand,
            brush_size: DEFAULT_BRUSH_SIZE,
        }
    }
}

impl SandboxState {
    pub fn from_config(config: &SandboxConfig) -> Self {
        let mut state = Self {
            selected_material: config.material,
            brush_size: DEFAULT_BRUSH_SIZE,
        };
        state.set_brush_size(config.brush_size);
        state
    }

    /// Set the brush size, clamped to the valid range. Returns the new size.
    pub fn set_brush_size(&mut self, size: i32) -> i32 {
        self.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        self.brush_size
    }

    pub fn grow_brush(&mut self) -> i32 {
        self.set_brush_size(self.brush_size + BRUSH_STEP)
    }

    pub fn shrink_brush(&mut self) -> i32 {
        self.set_brush_size(self.brush_size - BRUSH_STEP)
    }
}
