//! winit window events to [`InputEvent`]s

use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

use super::{InputEvent, Modifiers};

/// Pixels of touchpad scroll treated as one wheel notch
const PIXELS_PER_LINE: f64 = 40.0;

/// Tracks the modifier and cursor state winit reports separately from the
/// events that need it.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventTranslator {
    modifiers: Modifiers,
    cursor: (f64, f64),
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn cursor(&self) -> (f64, f64) {
        self.cursor
    }

    /// Translate one window event. Events with no input meaning, and key
    /// auto-repeat, yield `None`.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::ModifiersChanged(mods) => {
                self.modifiers = mods.state().into();
                None
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return None;
                }
                let PhysicalKey::Code(key) = event.physical_key else {
                    return None;
                };
                let modifiers = self.modifiers;
                Some(match event.state {
                    ElementState::Pressed => InputEvent::KeyDown { key, modifiers },
                    ElementState::Released => InputEvent::KeyUp { key, modifiers },
                })
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                Some(InputEvent::MouseMotion {
                    x: position.x,
                    y: position.y,
                })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let (x, y) = self.cursor;
                let button = *button;
                let modifiers = self.modifiers;
                Some(match state {
                    ElementState::Pressed => InputEvent::MouseButtonDown {
                        button,
                        modifiers,
                        x,
                        y,
                    },
                    ElementState::Released => InputEvent::MouseButtonUp {
                        button,
                        modifiers,
                        x,
                        y,
                    },
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                };
                (delta != 0.0).then_some(InputEvent::MouseWheel { delta })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, MouseButton, TouchPhase};
    use winit::keyboard::ModifiersState;

    use super::*;

    fn device() -> DeviceId {
        // SAFETY: only used as an opaque identifier in synthesized events
        unsafe { DeviceId::dummy() }
    }

    #[test]
    fn test_cursor_then_click_uses_position() {
        let mut translator = EventTranslator::new();
        let moved = translator.translate(&WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(12.0, 34.0),
        });
        assert_eq!(moved, Some(InputEvent::MouseMotion { x: 12.0, y: 34.0 }));

        let click = translator.translate(&WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Pressed,
            button: MouseButton::Left,
        });
        assert_eq!(
            click,
            Some(InputEvent::MouseButtonDown {
                button: MouseButton::Left,
                modifiers: Modifiers::empty(),
                x: 12.0,
                y: 34.0,
            })
        );
    }

    #[test]
    fn test_modifiers_carried_into_events() {
        let mut translator = EventTranslator::new();
        let changed =
            translator.translate(&WindowEvent::ModifiersChanged(ModifiersState::SHIFT.into()));
        assert!(changed.is_none());
        assert_eq!(translator.modifiers(), Modifiers::SHIFT);

        let release = translator.translate(&WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Released,
            button: MouseButton::Right,
        });
        assert!(matches!(
            release,
            Some(InputEvent::MouseButtonUp {
                button: MouseButton::Right,
                modifiers: Modifiers::SHIFT,
                ..
            })
        ));
    }

    #[test]
    fn test_wheel() {
        let mut translator = EventTranslator::new();
        let up = translator.translate(&WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            phase: TouchPhase::Moved,
        });
        assert_eq!(up, Some(InputEvent::MouseWheel { delta: 1.0 }));

        let down = translator.translate(&WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -80.0)),
            phase: TouchPhase::Moved,
        });
        assert_eq!(down, Some(InputEvent::MouseWheel { delta: -2.0 }));

        let horizontal = translator.translate(&WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(1.0, 0.0),
            phase: TouchPhase::Moved,
        });
        assert!(horizontal.is_none());
    }

    #[test]
    fn test_unrelated_events_ignored() {
        let mut translator = EventTranslator::new();
        assert!(translator.translate(&WindowEvent::Focused(true)).is_none());
        assert!(translator.translate(&WindowEvent::CloseRequested).is_none());
    }
}
