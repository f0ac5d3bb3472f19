//! Raw device events as seen by input contexts

use winit::event::MouseButton;
use winit::keyboard::{KeyCode, ModifiersState};

bitflags::bitflags! {
    /// Modifier keys held while an event fired
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CTRL = 0b0000_0010;
        const ALT = 0b0000_0100;
        const SUPER = 0b0000_1000;
    }
}

impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        let mut mods = Modifiers::empty();
        mods.set(Modifiers::SHIFT, state.shift_key());
        mods.set(Modifiers::CTRL, state.control_key());
        mods.set(Modifiers::ALT, state.alt_key());
        mods.set(Modifiers::SUPER, state.super_key());
        mods
    }
}

/// Device event fed through the context stack and legacy tables.
///
/// Mouse coordinates are window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown {
        key: KeyCode,
        modifiers: Modifiers,
    },
    KeyUp {
        key: KeyCode,
        modifiers: Modifiers,
    },
    MouseButtonDown {
        button: MouseButton,
        modifiers: Modifiers,
        x: f64,
        y: f64,
    },
    MouseButtonUp {
        button: MouseButton,
        modifiers: Modifiers,
        x: f64,
        y: f64,
    },
    /// Positive is wheel up
    MouseWheel { delta: f32 },
    MouseMotion { x: f64, y: f64 },
}

/// Discriminant of an [`InputEvent`], used to key the legacy event table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEventKind {
    KeyDown,
    KeyUp,
    MouseButtonDown,
    MouseButtonUp,
    MouseWheel,
    MouseMotion,
}

impl InputEvent {
    pub fn kind(&self) -> InputEventKind {
        match self {
            Self::KeyDown { .. } => InputEventKind::KeyDown,
            Self::KeyUp { .. } => InputEventKind::KeyUp,
            Self::MouseButtonDown { .. } => InputEventKind::MouseButtonDown,
            Self::MouseButtonUp { .. } => InputEventKind::MouseButtonUp,
            Self::MouseWheel { .. } => InputEventKind::MouseWheel,
            Self::MouseMotion { .. } => InputEventKind::MouseMotion,
        }
    }

    pub fn key_down(key: KeyCode) -> Self {
        Self::KeyDown {
            key,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn key_up(key: KeyCode) -> Self {
        Self::KeyUp {
            key,
            modifiers: Modifiers::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_from_winit() {
        let state = ModifiersState::SHIFT | ModifiersState::CONTROL;
        let mods = Modifiers::from(state);
        assert_eq!(mods, Modifiers::SHIFT | Modifiers::CTRL);
        assert_eq!(Modifiers::from(ModifiersState::empty()), Modifiers::empty());
    }

    #[test]
    fn test_kind() {
        assert_eq!(InputEvent::key_down(KeyCode::KeyA).kind(), InputEventKind::KeyDown);
        assert_eq!(
            InputEvent::MouseWheel { delta: -1.0 }.kind(),
            InputEventKind::MouseWheel
        );
    }
}
