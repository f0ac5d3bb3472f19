//! Deferred, replayable units of work
//!
//! Every input source (keyboard, mouse, chat, replay) produces [`Command`]s.
//! A command is a single record: identity metadata plus an effect closure.
//! Effects never capture host state; everything they may touch is handed to
//! them through a [`CommandContext`] at execution time.

use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use funhouse_shared::Grid;

use crate::chat::ChatCommand;
use crate::sandbox::SandboxState;

/// Effect (or undo) body of a command
pub type CommandEffect = Rc<dyn Fn(&mut CommandContext<'_>)>;

/// Requests a command can make of the dispatcher that is executing it.
///
/// Applied by the dispatcher immediately after the requesting command
/// returns, before the next queued command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    StartRecording,
    StopRecording,
    ToggleRecording,
    /// Play back the dispatcher's own recorded session
    StartPlayback,
    StopPlayback,
    TogglePlayback,
}

/// Everything a command effect is allowed to touch
pub struct CommandContext<'a> {
    grid: Option<&'a mut dyn Grid>,
    state: &'a mut SandboxState,
    requests: Vec<SessionRequest>,
}

impl<'a> CommandContext<'a> {
    pub fn new(grid: Option<&'a mut dyn Grid>, state: &'a mut SandboxState) -> Self {
        Self {
            grid,
            state,
            requests: Vec::new(),
        }
    }

    /// The target grid, if the host attached one
    pub fn grid(&mut self) -> Option<&mut (dyn Grid + 'a)> {
        self.grid.as_deref_mut()
    }

    pub fn state(&self) -> &SandboxState {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut SandboxState {
        &mut *self.state
    }

    pub fn request(&mut self, request: SessionRequest) {
        self.requests.push(request);
    }

    pub(crate) fn take_requests(&mut self) -> Vec<SessionRequest> {
        std::mem::take(&mut self.requests)
    }
}

/// Chat metadata carried by commands that originated in chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOrigin {
    pub username: String,
    pub command: String,
    pub parameters: String,
}

/// A deferred, executable, cloneable unit of effect.
///
/// Cloning shares the effect closure and keeps the original timestamp, which
/// is what the recorder and player rely on for timing.
#[derive(Clone)]
pub struct Command {
    name: String,
    timestamp: Instant,
    replayable: bool,
    origin: Option<ChatOrigin>,
    effect: CommandEffect,
    undo: Option<CommandEffect>,
}

impl Command {
    /// Create a replayable command stamped with the current instant
    pub fn new(name: impl Into<String>, effect: impl Fn(&mut CommandContext<'_>) + 'static) -> Self {
        Self {
            name: name.into(),
            timestamp: Instant::now(),
            replayable: true,
            origin: None,
            effect: Rc::new(effect),
            undo: None,
        }
    }

    /// Create a command from a chat command.
    ///
    /// The name becomes `chat:<command>` and the chat command's receive time is
    /// kept as the command timestamp.
    pub fn from_chat(
        chat: &ChatCommand,
        effect: impl Fn(&mut CommandContext<'_>) + 'static,
    ) -> Self {
        Self {
            name: format!("chat:{}", chat.command),
            timestamp: chat.timestamp,
            replayable: true,
            origin: Some(ChatOrigin {
                username: chat.username.clone(),
                command: chat.command.clone(),
                parameters: chat.parameters.clone(),
            }),
            effect: Rc::new(effect),
            undo: None,
        }
    }

    /// A command with no effect, used for unhandled chat commands
    pub fn noop(name: impl Into<String>) -> Self {
        Self::new(name, |_| {})
    }

    /// Exclude this command from recordings
    pub fn non_replayable(mut self) -> Self {
        self.replayable = false;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_undo(mut self, undo: impl Fn(&mut CommandContext<'_>) + 'static) -> Self {
        self.undo = Some(Rc::new(undo));
        self
    }

    pub fn execute(&self, ctx: &mut CommandContext<'_>) {
        (self.effect)(ctx);
    }

    /// Reverse the effect. Commands without an undo body do nothing.
    pub fn undo(&self, ctx: &mut CommandContext<'_>) {
        if let Some(undo) = &self.undo {
            undo(ctx);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    pub fn is_replayable(&self) -> bool {
        self.replayable
    }

    /// Chat metadata, for commands that came from chat
    pub fn chat(&self) -> Option<&ChatOrigin> {
        self.origin.as_ref()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("timestamp", &self.timestamp)
            .field("replayable", &self.replayable)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Anything commands can be pushed into
pub trait CommandSink {
    fn queue_command(&mut self, command: Command);
}

#[cfg(test)]
mod tests {
    use super::*;
    use funhouse_shared::{Material, VecGrid};
    use std::cell::Cell;
    use std::time::Duration;

    #[test]
    fn test_command_defaults() {
        let cmd = Command::new("Test", |_| {});
        assert_eq!(cmd.name(), "Test");
        assert!(cmd.is_replayable());
        assert!(cmd.chat().is_none());
        assert!(!cmd.clone().non_replayable().is_replayable());
    }

    #[test]
    fn test_command_executes_against_context() {
        let mut grid = VecGrid::new(4, 4);
        let mut state = SandboxState::default();
        let cmd = Command::new("Place", |ctx| {
            let material = ctx.state().selected_material;
            if let Some(grid) = ctx.grid() {
                grid.set_pixel(1, 1, material);
            }
        });

        let mut ctx = CommandContext::new(Some(&mut grid as &mut dyn Grid), &mut state);
        cmd.execute(&mut ctx);
        drop(ctx);
        assert_eq!(grid.get_pixel(1, 1), Material::Sand);
    }

    #[test]
    fn test_command_tolerates_missing_grid() {
        let mut state = SandboxState::default();
        let cmd = Command::new("Clear", |ctx| {
            if let Some(grid) = ctx.grid() {
                grid.clear();
            }
        });
        let mut ctx = CommandContext::new(None, &mut state);
        cmd.execute(&mut ctx);
    }

    #[test]
    fn test_clone_shares_effect_and_keeps_timestamp() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let stamp = Instant::now() - Duration::from_secs(3);
        let cmd = Command::new("Count", move |_| counter.set(counter.get() + 1))
            .with_timestamp(stamp);
        let copy = cmd.clone();

        let mut state = SandboxState::default();
        let mut ctx = CommandContext::new(None, &mut state);
        cmd.execute(&mut ctx);
        copy.execute(&mut ctx);

        assert_eq!(hits.get(), 2);
        assert_eq!(copy.timestamp(), stamp);
    }

    #[test]
    fn test_undo_defaults_to_noop() {
        let undone = Rc::new(Cell::new(false));
        let flag = undone.clone();
        let mut state = SandboxState::default();
        let mut ctx = CommandContext::new(None, &mut state);

        Command::new("Plain", |_| {}).undo(&mut ctx);
        assert!(!undone.get());

        Command::new("Undoable", |_| {})
            .with_undo(move |_| flag.set(true))
            .undo(&mut ctx);
        assert!(undone.get());
    }

    #[test]
    fn test_from_chat_keeps_metadata() {
        let chat = ChatCommand::new("alice", "spawn", "sand 1 2");
        let cmd = Command::from_chat(&chat, |_| {});
        assert_eq!(cmd.name(), "chat:spawn");
        assert_eq!(cmd.timestamp(), chat.timestamp);
        let origin = cmd.chat().unwrap();
        assert_eq!(origin.username, "alice");
        assert_eq!(origin.parameters, "sand 1 2");
    }

    #[test]
    fn test_requests_are_collected() {
        let mut state = SandboxState::default();
        let mut ctx = CommandContext::new(None, &mut state);
        Command::new("Toggle", |ctx| ctx.request(SessionRequest::ToggleRecording))
            .execute(&mut ctx);
        assert_eq!(ctx.take_requests(), vec![SessionRequest::ToggleRecording]);
        assert!(ctx.take_requests().is_empty());
    }
}
