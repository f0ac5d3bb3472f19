//! Keyboard and mouse state tracked across events

use hashbrown::HashSet;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use super::InputEvent;

/// Held keys plus this frame's transitions
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    pressed: HashSet<KeyCode>,
    just_pressed: HashSet<KeyCode>,
    just_released: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: KeyCode) -> bool {
        self.just_released.contains(&key)
    }

    fn press(&mut self, key: KeyCode) {
        if self.pressed.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    fn release(&mut self, key: KeyCode) {
        if self.pressed.remove(&key) {
            self.just_released.insert(key);
        }
    }
}

/// Cursor position (window pixels), buttons and this frame's wheel movement
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MouseState {
    pub x: f64,
    pub y: f64,
    pub left: bool,
    pub right: bool,
    pub middle: bool,
    pub wheel_delta: f32,
}

impl MouseState {
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
            _ => false,
        }
    }

    fn set_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.left = pressed,
            MouseButton::Right => self.right = pressed,
            MouseButton::Middle => self.middle = pressed,
            _ => {}
        }
    }
}

/// Combined device state, fed every processed event
#[derive(Debug, Default, Clone)]
pub struct DeviceState {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
}

impl DeviceState {
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown { key, .. } => self.keyboard.press(key),
            InputEvent::KeyUp { key, .. } => self.keyboard.release(key),
            InputEvent::MouseButtonDown { button, x, y, .. } => {
                self.mouse.x = x;
                self.mouse.y = y;
                self.mouse.set_button(button, true);
            }
            InputEvent::MouseButtonUp { button, x, y, .. } => {
                self.mouse.x = x;
                self.mouse.y = y;
                self.mouse.set_button(button, false);
            }
            InputEvent::MouseWheel { delta } => self.mouse.wheel_delta += delta,
            InputEvent::MouseMotion { x, y } => {
                self.mouse.x = x;
                self.mouse.y = y;
            }
        }
    }

    /// Forget last frame's transitions and wheel movement
    pub fn begin_frame(&mut self) {
        self.keyboard.just_pressed.clear();
        self.keyboard.just_released.clear();
        self.mouse.wheel_delta = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_transitions() {
        let mut device = DeviceState::default();
        device.apply(&InputEvent::key_down(KeyCode::KeyA));
        assert!(device.keyboard.is_pressed(KeyCode::KeyA));
        assert!(device.keyboard.is_just_pressed(KeyCode::KeyA));

        // held across frames, no new transition
        device.begin_frame();
        device.apply(&InputEvent::key_down(KeyCode::KeyA));
        assert!(device.keyboard.is_pressed(KeyCode::KeyA));
        assert!(!device.keyboard.is_just_pressed(KeyCode::KeyA));

        device.apply(&InputEvent::key_up(KeyCode::KeyA));
        assert!(!device.keyboard.is_pressed(KeyCode::KeyA));
        assert!(device.keyboard.is_just_released(KeyCode::KeyA));

        device.begin_frame();
        assert!(!device.keyboard.is_just_released(KeyCode::KeyA));
    }

    #[test]
    fn test_mouse_tracking() {
        let mut device = DeviceState::default();
        device.apply(&InputEvent::MouseMotion { x: 10.0, y: 20.0 });
        device.apply(&InputEvent::MouseButtonDown {
            button: MouseButton::Right,
            modifiers: Default::default(),
            x: 11.0,
            y: 21.0,
        });
        device.apply(&InputEvent::MouseWheel { delta: 1.0 });
        device.apply(&InputEvent::MouseWheel { delta: 0.5 });

        assert!(device.mouse.right);
        assert!(device.mouse.is_pressed(MouseButton::Right));
        assert!(!device.mouse.left);
        assert_eq!((device.mouse.x, device.mouse.y), (11.0, 21.0));
        assert_eq!(device.mouse.wheel_delta, 1.5);

        device.begin_frame();
        assert_eq!(device.mouse.wheel_delta, 0.0);
        assert!(device.mouse.right);
    }
}
