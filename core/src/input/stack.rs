//! Priority-ordered set of input contexts

use std::cmp::Reverse;

use super::{InputContext, InputEvent};
use crate::command::Command;
use crate::sandbox::SandboxState;

/// Contexts resolved highest priority first.
///
/// The first active context whose binding produces a command wins. Equal
/// priorities keep insertion order. Sorting happens lazily, on the first
/// event after a membership or priority change.
#[derive(Default)]
pub struct InputContextStack {
    contexts: Vec<InputContext>,
    needs_sort: bool,
}

impl InputContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a context. A context with the same name is replaced.
    pub fn add_context(&mut self, context: InputContext) {
        if let Some(existing) = self.contexts.iter_mut().find(|c| c.name() == context.name()) {
            tracing::debug!(context = context.name(), "Replacing input context");
            *existing = context;
        } else {
            self.contexts.push(context);
        }
        self.needs_sort = true;
    }

    pub fn remove_context(&mut self, name: &str) -> Option<InputContext> {
        let index = self.contexts.iter().position(|c| c.name() == name)?;
        Some(self.contexts.remove(index))
    }

    pub fn context(&self, name: &str) -> Option<&InputContext> {
        self.contexts.iter().find(|c| c.name() == name)
    }

    /// Mutable access to a context. Priority changes made through it are
    /// picked up on the next event.
    pub fn context_mut(&mut self, name: &str) -> Option<&mut InputContext> {
        let context = self.contexts.iter_mut().find(|c| c.name() == name)?;
        self.needs_sort = true;
        Some(context)
    }

    /// Returns `false` if no context has that name
    pub fn activate(&mut self, name: &str) -> bool {
        self.set_active(name, |_| true)
    }

    pub fn deactivate(&mut self, name: &str) -> bool {
        self.set_active(name, |_| false)
    }

    pub fn toggle(&mut self, name: &str) -> bool {
        self.set_active(name, |active| !active)
    }

    fn set_active(&mut self, name: &str, f: impl FnOnce(bool) -> bool) -> bool {
        match self.contexts.iter_mut().find(|c| c.name() == name) {
            Some(context) => {
                let active = f(context.is_active());
                context.set_active(active);
                tracing::debug!(context = name, active, "Input context toggled");
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.contexts.clear();
        self.needs_sort = false;
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Names of active contexts, highest priority first
    pub fn active_contexts(&self) -> Vec<&str> {
        let mut active: Vec<&InputContext> =
            self.contexts.iter().filter(|c| c.is_active()).collect();
        active.sort_by_key(|c| Reverse(c.priority()));
        active.into_iter().map(InputContext::name).collect()
    }

    /// Resolve `event` against the active contexts
    pub fn process_event(&mut self, event: &InputEvent, state: &mut SandboxState) -> Option<Command> {
        self.sort_if_needed();
        self.contexts
            .iter()
            .filter(|c| c.is_active())
            .find_map(|c| c.process_event(event, state))
    }

    fn sort_if_needed(&mut self) {
        if self.needs_sort {
            self.contexts.sort_by_key(|c| Reverse(c.priority()));
            self.needs_sort = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use winit::keyboard::KeyCode;

    use super::*;
    use crate::input::Modifiers;

    fn context_binding(name: &'static str, priority: i32, key: KeyCode) -> InputContext {
        let mut ctx = InputContext::new(name, priority);
        ctx.bind_key_down(key, Modifiers::empty(), move |_, _| Some(Command::noop(name)));
        ctx
    }

    fn resolve(stack: &mut InputContextStack, key: KeyCode) -> Option<String> {
        let mut state = SandboxState::default();
        stack
            .process_event(&InputEvent::key_down(key), &mut state)
            .map(|cmd| cmd.name().to_string())
    }

    #[test]
    fn test_higher_priority_wins_regardless_of_order() {
        let mut stack = InputContextStack::new();
        stack.add_context(context_binding("low", 10, KeyCode::KeyA));
        stack.add_context(context_binding("high", 20, KeyCode::KeyA));
        assert_eq!(resolve(&mut stack, KeyCode::KeyA).as_deref(), Some("high"));

        let mut stack = InputContextStack::new();
        stack.add_context(context_binding("high", 20, KeyCode::KeyA));
        stack.add_context(context_binding("low", 10, KeyCode::KeyA));
        assert_eq!(resolve(&mut stack, KeyCode::KeyA).as_deref(), Some("high"));
    }

    #[test]
    fn test_inactive_context_skipped() {
        let mut stack = InputContextStack::new();
        stack.add_context(context_binding("modal", 100, KeyCode::KeyA));
        stack.add_context(context_binding("base", 1, KeyCode::KeyA));
        stack.deactivate("modal");

        assert_eq!(resolve(&mut stack, KeyCode::KeyA).as_deref(), Some("base"));
        assert_eq!(stack.active_contexts(), ["base"]);
    }

    #[test]
    fn test_falls_through_to_lower_priority() {
        let mut stack = InputContextStack::new();
        stack.add_context(context_binding("high", 20, KeyCode::KeyA));
        stack.add_context(context_binding("low", 10, KeyCode::KeyB));
        assert_eq!(resolve(&mut stack, KeyCode::KeyB).as_deref(), Some("low"));
        assert!(resolve(&mut stack, KeyCode::KeyC).is_none());
    }

    #[test]
    fn test_equal_priority_keeps_insertion_order() {
        let mut stack = InputContextStack::new();
        stack.add_context(context_binding("first", 5, KeyCode::KeyA));
        stack.add_context(context_binding("second", 5, KeyCode::KeyA));
        assert_eq!(resolve(&mut stack, KeyCode::KeyA).as_deref(), Some("first"));
    }

    #[test]
    fn test_priority_change_resorts() {
        let mut stack = InputContextStack::new();
        stack.add_context(context_binding("a", 10, KeyCode::KeyA));
        stack.add_context(context_binding("b", 5, KeyCode::KeyA));
        assert_eq!(resolve(&mut stack, KeyCode::KeyA).as_deref(), Some("a"));

        stack.context_mut("b").unwrap().set_priority(50);
        assert_eq!(resolve(&mut stack, KeyCode::KeyA).as_deref(), Some("b"));
    }

    #[test]
    fn test_toggle_and_remove() {
        let mut stack = InputContextStack::new();
        stack.add_context(context_binding("a", 0, KeyCode::KeyA));

        assert!(stack.toggle("a"));
        assert!(!stack.context("a").unwrap().is_active());
        assert!(stack.toggle("a"));
        assert!(stack.context("a").unwrap().is_active());
        assert!(!stack.toggle("missing"));

        assert!(stack.remove_context("a").is_some());
        assert!(stack.is_empty());
        assert!(resolve(&mut stack, KeyCode::KeyA).is_none());
    }

    #[test]
    fn test_add_same_name_replaces() {
        let mut stack = InputContextStack::new();
        stack.add_context(context_binding("a", 0, KeyCode::KeyA));
        stack.add_context(context_binding("a", 0, KeyCode::KeyB));
        assert_eq!(stack.len(), 1);
        assert!(resolve(&mut stack, KeyCode::KeyA).is_none());
        assert!(resolve(&mut stack, KeyCode::KeyB).is_some());
    }
}
