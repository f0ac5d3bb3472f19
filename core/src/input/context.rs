//! Named, prioritized binding tables

use std::hash::Hash;
use std::rc::Rc;

use hashbrown::HashMap;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use super::{InputEvent, Modifiers};
use crate::command::Command;
use crate::sandbox::SandboxState;

/// Turns a device event into a command.
///
/// Factories may adjust the sandbox state directly and return `None` when the
/// event needs no deferred effect.
pub type CommandFactory = Rc<dyn Fn(&InputEvent, &mut SandboxState) -> Option<Command>>;

type Bindings<K> = HashMap<(K, Modifiers), CommandFactory>;

/// A named table of bindings that can be switched on and off as a unit.
///
/// Keys and buttons are bound per modifier mask. Lookup tries the exact mask
/// first, then the binding with no modifiers.
pub struct InputContext {
    name: String,
    priority: i32,
    active: bool,
    key_down: Bindings<KeyCode>,
    key_up: Bindings<KeyCode>,
    mouse_down: Bindings<MouseButton>,
    mouse_up: Bindings<MouseButton>,
    wheel_up: Option<CommandFactory>,
    wheel_down: Option<CommandFactory>,
    motion: Option<CommandFactory>,
}

impl InputContext {
    /// New active context with no bindings
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            active: true,
            key_down: HashMap::new(),
            key_up: HashMap::new(),
            mouse_down: HashMap::new(),
            mouse_up: HashMap::new(),
            wheel_up: None,
            wheel_down: None,
            motion: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn bind_key_down(
        &mut self,
        key: KeyCode,
        modifiers: Modifiers,
        factory: impl Fn(&InputEvent, &mut SandboxState) -> Option<Command> + 'static,
    ) {
        self.key_down.insert((key, modifiers), Rc::new(factory));
    }

    pub fn bind_key_up(
        &mut self,
        key: KeyCode,
        modifiers: Modifiers,
        factory: impl Fn(&InputEvent, &mut SandboxState) -> Option<Command> + 'static,
    ) {
        self.key_up.insert((key, modifiers), Rc::new(factory));
    }

    pub fn bind_mouse_down(
        &mut self,
        button: MouseButton,
        modifiers: Modifiers,
        factory: impl Fn(&InputEvent, &mut SandboxState) -> Option<Command> + 'static,
    ) {
        self.mouse_down.insert((button, modifiers), Rc::new(factory));
    }

    pub fn bind_mouse_up(
        &mut self,
        button: MouseButton,
        modifiers: Modifiers,
        factory: impl Fn(&InputEvent, &mut SandboxState) -> Option<Command> + 'static,
    ) {
        self.mouse_up.insert((button, modifiers), Rc::new(factory));
    }

    pub fn bind_wheel_up(
        &mut self,
        factory: impl Fn(&InputEvent, &mut SandboxState) -> Option<Command> + 'static,
    ) {
        self.wheel_up = Some(Rc::new(factory));
    }

    pub fn bind_wheel_down(
        &mut self,
        factory: impl Fn(&InputEvent, &mut SandboxState) -> Option<Command> + 'static,
    ) {
        self.wheel_down = Some(Rc::new(factory));
    }

    pub fn bind_motion(
        &mut self,
        factory: impl Fn(&InputEvent, &mut SandboxState) -> Option<Command> + 'static,
    ) {
        self.motion = Some(Rc::new(factory));
    }

    /// Remove both the key-down and key-up bindings for `(key, modifiers)`
    pub fn unbind_key(&mut self, key: KeyCode, modifiers: Modifiers) {
        self.key_down.remove(&(key, modifiers));
        self.key_up.remove(&(key, modifiers));
    }

    pub fn unbind_mouse_button(&mut self, button: MouseButton, modifiers: Modifiers) {
        self.mouse_down.remove(&(button, modifiers));
        self.mouse_up.remove(&(button, modifiers));
    }

    pub fn unbind_wheel(&mut self) {
        self.wheel_up = None;
        self.wheel_down = None;
    }

    pub fn unbind_motion(&mut self) {
        self.motion = None;
    }

    pub fn clear_bindings(&mut self) {
        self.key_down.clear();
        self.key_up.clear();
        self.mouse_down.clear();
        self.mouse_up.clear();
        self.wheel_up = None;
        self.wheel_down = None;
        self.motion = None;
    }

    /// Run the binding for `event`, if any. Ignores the active flag.
    pub fn process_event(&self, event: &InputEvent, state: &mut SandboxState) -> Option<Command> {
        let factory = match *event {
            InputEvent::KeyDown { key, modifiers } => lookup(&self.key_down, key, modifiers),
            InputEvent::KeyUp { key, modifiers } => lookup(&self.key_up, key, modifiers),
            InputEvent::MouseButtonDown {
                button, modifiers, ..
            } => lookup(&self.mouse_down, button, modifiers),
            InputEvent::MouseButtonUp {
                button, modifiers, ..
            } => lookup(&self.mouse_up, button, modifiers),
            InputEvent::MouseWheel { delta } if delta > 0.0 => self.wheel_up.as_ref(),
            InputEvent::MouseWheel { delta } if delta < 0.0 => self.wheel_down.as_ref(),
            InputEvent::MouseWheel { .. } => None,
            InputEvent::MouseMotion { .. } => self.motion.as_ref(),
        }?;
        factory(event, state)
    }
}

fn lookup<K: Copy + Eq + Hash>(
    bindings: &Bindings<K>,
    key: K,
    modifiers: Modifiers,
) -> Option<&CommandFactory> {
    bindings.get(&(key, modifiers)).or_else(|| {
        if modifiers.is_empty() {
            None
        } else {
            bindings.get(&(key, Modifiers::empty()))
        }
    })
}
