//! Flat, unprioritized factory tables consulted when no context matched

use hashbrown::HashMap;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::command::CommandSink;
use crate::input::{CommandFactory, InputEvent, InputEventKind};
use crate::sandbox::SandboxState;

/// Factories keyed by event kind, by key (key-down only) and by mouse button
/// (button-down only). Every matching factory runs, in registration order.
#[derive(Default)]
pub struct LegacyBindings {
    by_kind: HashMap<InputEventKind, Vec<CommandFactory>>,
    by_key: HashMap<KeyCode, Vec<CommandFactory>>,
    by_button: HashMap<MouseButton, Vec<CommandFactory>>,
}

impl LegacyBindings {
    pub fn register_event(&mut self, kind: InputEventKind, factory: CommandFactory) {
        self.by_kind.entry(kind).or_default().push(factory);
    }

    pub fn register_key(&mut self, key: KeyCode, factory: CommandFactory) {
        self.by_key.entry(key).or_default().push(factory);
    }

    pub fn register_mouse_button(&mut self, button: MouseButton, factory: CommandFactory) {
        self.by_button.entry(button).or_default().push(factory);
    }

    pub fn clear(&mut self) {
        self.by_kind.clear();
        self.by_key.clear();
        self.by_button.clear();
    }

    /// Run every matching factory, queueing what they produce. Returns how
    /// many commands were queued.
    pub fn process(
        &self,
        event: &InputEvent,
        state: &mut SandboxState,
        sink: &mut dyn CommandSink,
    ) -> usize {
        let by_device = match *event {
            InputEvent::KeyDown { key, .. } => self.by_key.get(&key),
            InputEvent::MouseButtonDown { button, .. } => self.by_button.get(&button),
            _ => None,
        };

        let factories = self
            .by_kind
            .get(&event.kind())
            .into_iter()
            .chain(by_device)
            .flatten();

        let mut queued = 0;
        for factory in factories {
            if let Some(command) = factory(event, state) {
                sink.queue_command(command);
                queued += 1;
            }
        }
        queued
    }
}
