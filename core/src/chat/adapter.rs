//! Turns buffered chat commands into generic [`Command`]s

use std::rc::Rc;

use hashbrown::HashMap;

use super::{ChatCommand, ChatHandle};
use crate::command::{Command, CommandContext, CommandSink};

/// Builds a command from a chat command. `None` drops the chat command.
pub type ChatCommandFactory = Rc<dyn Fn(&ChatCommand) -> Option<Command>>;

/// Plain `(context, user, command, parameters)` handler run at execution time
pub type ChatCallback = Rc<dyn Fn(&mut CommandContext<'_>, &str, &str, &str)>;

/// Per-tick poller over a chat connection's buffer.
///
/// Lives on the simulation thread; the only thing it shares with the
/// transport thread is the buffer inside its [`ChatHandle`].
pub struct ChatCommandAdapter {
    chat: Option<ChatHandle>,
    handlers: HashMap<String, ChatCommandFactory>,
    default_handler: ChatCommandFactory,
    process_unregistered: bool,
}

impl ChatCommandAdapter {
    pub fn new(chat: Option<ChatHandle>) -> Self {
        Self {
            chat,
            handlers: HashMap::new(),
            default_handler: Rc::new(default_handler),
            process_unregistered: true,
        }
    }

    /// Drain new chat commands into `sink`. Returns how many commands were queued.
    pub fn update(&mut self, sink: &mut dyn CommandSink) -> usize {
        let Some(chat) = &self.chat else {
            return 0;
        };

        let mut queued = 0;
        for chat_command in chat.buffer().get_new_commands() {
            let factory = match self.handlers.get(&chat_command.command) {
                Some(factory) => factory,
                None if self.process_unregistered => &self.default_handler,
                None => {
                    tracing::trace!(command = %chat_command.command, "Dropping unregistered chat command");
                    continue;
                }
            };

            if let Some(command) = factory(&chat_command) {
                sink.queue_command(command);
                queued += 1;
            }
        }
        queued
    }

    /// Register `factory` for `name` (without prefix), replacing any previous one
    pub fn register_command_handler(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&ChatCommand) -> Option<Command> + 'static,
    ) {
        let name = name.into().to_lowercase();
        if self.handlers.insert(name.clone(), Rc::new(factory)).is_some() {
            tracing::debug!(command = %name, "Replaced chat command handler");
        }
    }

    /// Register a callback that runs when the produced command executes
    pub fn register_command_callback(
        &mut self,
        name: impl Into<String>,
        callback: impl Fn(&mut CommandContext<'_>, &str, &str, &str) + 'static,
    ) {
        let callback: ChatCallback = Rc::new(callback);
        self.register_command_handler(name, move |chat: &ChatCommand| {
            let callback = callback.clone();
            let (user, command, parameters) = (
                chat.username.clone(),
                chat.command.clone(),
                chat.parameters.clone(),
            );
            Some(Command::from_chat(chat, move |ctx| {
                callback(ctx, &user, &command, &parameters)
            }))
        });
    }

    pub fn set_default_handler(
        &mut self,
        factory: impl Fn(&ChatCommand) -> Option<Command> + 'static,
    ) {
        self.default_handler = Rc::new(factory);
    }

    pub fn set_process_unregistered_commands(&mut self, process: bool) {
        self.process_unregistered = process;
    }

    /// False when no transport is attached
    pub fn is_connected(&self) -> bool {
        self.chat.as_ref().is_some_and(ChatHandle::is_connected)
    }

    pub fn set_chat(&mut self, chat: Option<ChatHandle>) {
        self.chat = chat;
    }

    /// Registered command names, sorted
    pub fn registered_commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn default_handler(chat: &ChatCommand) -> Option<Command> {
    tracing::debug!(
        user = %chat.username,
        command = %chat.command,
        parameters = %chat.parameters,
        "Unhandled chat command"
    );
    Some(Command::from_chat(chat, |_| {}))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Arc;

    use super::*;
    use crate::chat::CommandBuffer;
    use crate::sandbox::SandboxState;

    #[derive(Default)]
    struct Collect(Vec<Command>);

    impl CommandSink for Collect {
        fn queue_command(&mut self, command: Command) {
            self.0.push(command);
        }
    }

    fn adapter_with_buffer() -> (ChatCommandAdapter, Arc<CommandBuffer>) {
        let buffer = Arc::new(CommandBuffer::new(8));
        let adapter = ChatCommandAdapter::new(Some(ChatHandle::detached(buffer.clone())));
        (adapter, buffer)
    }

    #[test]
    fn test_no_transport_is_noop() {
        let mut adapter = ChatCommandAdapter::new(None);
        let mut sink = Collect::default();
        assert_eq!(adapter.update(&mut sink), 0);
        assert!(!adapter.is_connected());
    }

    #[test]
    fn test_registered_handler_used() {
        let (mut adapter, buffer) = adapter_with_buffer();
        adapter.register_command_handler("sand", |chat| {
            Some(Command::from_chat(chat, |ctx| {
                ctx.state_mut().selected_material = funhouse_shared::Material::Sand
            }))
        });

        buffer.add_command(ChatCommand::new("alice", "sand", ""));
        let mut sink = Collect::default();
        assert_eq!(adapter.update(&mut sink), 1);
        assert_eq!(sink.0[0].name(), "chat:sand");
        assert_eq!(sink.0[0].chat().unwrap().username, "alice");

        // already consumed
        assert_eq!(adapter.update(&mut sink), 0);
    }

    #[test]
    fn test_default_handler_for_unregistered() {
        let (mut adapter, buffer) = adapter_with_buffer();
        buffer.add_command(ChatCommand::new("bob", "dance", "now"));

        let mut sink = Collect::default();
        assert_eq!(adapter.update(&mut sink), 1);
        assert_eq!(sink.0[0].name(), "chat:dance");
    }

    #[test]
    fn test_unregistered_dropped_when_disabled() {
        let (mut adapter, buffer) = adapter_with_buffer();
        adapter.set_process_unregistered_commands(false);
        buffer.add_command(ChatCommand::new("bob", "dance", ""));

        let mut sink = Collect::default();
        assert_eq!(adapter.update(&mut sink), 0);
        assert!(sink.0.is_empty());
    }

    #[test]
    fn test_custom_default_handler() {
        let (mut adapter, buffer) = adapter_with_buffer();
        adapter.set_default_handler(|_| None);
        buffer.add_command(ChatCommand::new("bob", "dance", ""));

        let mut sink = Collect::default();
        assert_eq!(adapter.update(&mut sink), 0);
    }

    #[test]
    fn test_callback_receives_fields_on_execute() {
        let (mut adapter, buffer) = adapter_with_buffer();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in = seen.clone();
        adapter.register_command_callback("Echo", move |_, user, command, params| {
            seen_in
                .borrow_mut()
                .push(format!("{user}/{command}/{params}"));
        });

        buffer.add_command(ChatCommand::new("carol", "echo", "hi there"));
        let mut sink = Collect::default();
        adapter.update(&mut sink);
        assert!(seen.borrow().is_empty());

        let mut state = SandboxState::default();
        let mut ctx = CommandContext::new(None, &mut state);
        sink.0[0].execute(&mut ctx);
        assert_eq!(seen.borrow().as_slice(), ["carol/echo/hi there"]);
    }

    #[test]
    fn test_reregistration_overwrites() {
        let (mut adapter, buffer) = adapter_with_buffer();
        adapter.register_command_handler("x", |_| Some(Command::noop("first")));
        adapter.register_command_handler("x", |_| Some(Command::noop("second")));
        assert_eq!(adapter.registered_commands(), ["x"]);

        buffer.add_command(ChatCommand::new("dave", "x", ""));
        let mut sink = Collect::default();
        adapter.update(&mut sink);
        assert_eq!(sink.0[0].name(), "second");
    }

    #[test]
    fn test_arrival_order_preserved() {
        let (mut adapter, buffer) = adapter_with_buffer();
        for name in ["a", "b", "c"] {
            buffer.add_command(ChatCommand::new("eve", name, ""));
        }
        let mut sink = Collect::default();
        adapter.update(&mut sink);
        let names: Vec<_> = sink.0.iter().map(Command::name).collect();
        assert_eq!(names, ["chat:a", "chat:b", "chat:c"]);
    }
}
