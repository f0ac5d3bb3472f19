//! Single-threaded command dispatch
//!
//! Every producer (contexts, legacy tables, chat adapter, player) feeds one
//! [`CommandQueue`]; the host drains it once per tick with
//! [`CommandDispatcher::execute_commands`].

mod legacy;
mod queue;

use std::rc::Rc;
use std::time::Instant;

use winit::event::{MouseButton, WindowEvent};
use winit::keyboard::KeyCode;

use crate::command::{Command, CommandContext, CommandSink, SessionRequest};
use crate::input::{
    DeviceState, EventTranslator, InputContext, InputContextStack, InputEvent, InputEventKind,
    KeyboardState, MouseState,
};
use crate::replay::{Player, RecordedSession, Recorder};
use crate::sandbox::SandboxState;

pub use legacy::LegacyBindings;
pub use queue::CommandQueue;

/// Owns the queue, the input contexts, recording and playback.
///
/// Not thread-safe; it lives on the simulation thread.
#[derive(Default)]
pub struct CommandDispatcher {
    queue: CommandQueue,
    contexts: InputContextStack,
    legacy: LegacyBindings,
    recorder: Recorder,
    player: Player,
    device: DeviceState,
    translator: EventTranslator,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a device event through the contexts, then the legacy tables.
    ///
    /// Returns `true` if any command was queued.
    pub fn process_event(&mut self, event: &InputEvent, state: &mut SandboxState) -> bool {
        self.device.apply(event);

        if let Some(command) = self.contexts.process_event(event, state) {
            self.queue.push(command);
            return true;
        }

        self.legacy.process(event, state, &mut self.queue) > 0
    }

    /// Translate and route a winit window event
    pub fn process_window_event(&mut self, event: &WindowEvent, state: &mut SandboxState) -> bool {
        match self.translator.translate(event) {
            Some(event) => self.process_event(&event, state),
            None => false,
        }
    }

    /// Start a new frame: clear input transitions and enqueue due playback
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    pub fn update_at(&mut self, now: Instant) {
        self.device.begin_frame();
        self.player.update_at(now, &mut self.queue);
    }

    /// Execute every queued command in order, recording replayable ones.
    ///
    /// Session requests made by a command are applied before the next command
    /// runs. Returns the number of commands executed.
    pub fn execute_commands(&mut self, ctx: &mut CommandContext<'_>) -> usize {
        let mut executed = 0;
        while let Some(command) = self.queue.pop() {
            command.execute(ctx);
            self.recorder.record(&command);
            executed += 1;

            for request in ctx.take_requests() {
                self.apply_request(request);
            }
        }
        executed
    }

    fn apply_request(&mut self, request: SessionRequest) {
        match request {
            SessionRequest::StartRecording => self.start_recording(),
            SessionRequest::StopRecording => self.stop_recording(),
            SessionRequest::ToggleRecording => {
                if self.is_recording() {
                    self.stop_recording();
                } else {
                    self.start_recording();
                }
            }
            SessionRequest::StartPlayback => {
                self.start_recorded_playback();
            }
            SessionRequest::StopPlayback => self.stop_playback(),
            SessionRequest::TogglePlayback => {
                if self.is_playing_back() {
                    self.stop_playback();
                } else {
                    self.start_recorded_playback();
                }
            }
        }
    }

    pub fn queue_command(&mut self, command: Command) {
        self.queue.push(command);
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    // Legacy flat tables

    pub fn register_command_factory(
        &mut self,
        kind: InputEventKind,
        factory: impl Fn(&InputEvent, &mut SandboxState) -> Option<Command> + 'static,
    ) {
        self.legacy.register_event(kind, Rc::new(factory));
    }

    pub fn register_key_command_factory(
        &mut self,
        key: KeyCode,
        factory: impl Fn(&InputEvent, &mut SandboxState) -> Option<Command> + 'static,
    ) {
        self.legacy.register_key(key, Rc::new(factory));
    }

    pub fn register_mouse_command_factory(
        &mut self,
        button: MouseButton,
        factory: impl Fn(&InputEvent, &mut SandboxState) -> Option<Command> + 'static,
    ) {
        self.legacy.register_mouse_button(button, Rc::new(factory));
    }

    pub fn clear_legacy_factories(&mut self) {
        self.legacy.clear();
    }

    // Contexts

    pub fn add_context(&mut self, context: InputContext) {
        self.contexts.add_context(context);
    }

    pub fn remove_context(&mut self, name: &str) -> Option<InputContext> {
        self.contexts.remove_context(name)
    }

    pub fn context(&self, name: &str) -> Option<&InputContext> {
        self.contexts.context(name)
    }

    pub fn context_mut(&mut self, name: &str) -> Option<&mut InputContext> {
        self.contexts.context_mut(name)
    }

    pub fn activate_context(&mut self, name: &str) -> bool {
        self.contexts.activate(name)
    }

    pub fn deactivate_context(&mut self, name: &str) -> bool {
        self.contexts.deactivate(name)
    }

    pub fn toggle_context(&mut self, name: &str) -> bool {
        self.contexts.toggle(name)
    }

    pub fn contexts(&self) -> &InputContextStack {
        &self.contexts
    }

    // Recording

    /// Start recording, discarding the previous session
    pub fn start_recording(&mut self) {
        self.recorder.start();
        tracing::info!("Recording started");
    }

    pub fn stop_recording(&mut self) {
        self.recorder.stop();
        tracing::info!(commands = self.recorder.len(), "Recording stopped");
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn recorded_commands(&self) -> &RecordedSession {
        self.recorder.session()
    }

    // Playback

    /// Play back a copy of `session`. Returns `false` if it is empty.
    pub fn start_playback(&mut self, session: &RecordedSession) -> bool {
        self.player.start(session)
    }

    /// Play back the dispatcher's own recorded session
    pub fn start_recorded_playback(&mut self) -> bool {
        self.player.start(self.recorder.session())
    }

    pub fn stop_playback(&mut self) {
        if self.player.is_playing() {
            tracing::info!("Playback stopped");
        }
        self.player.stop();
    }

    pub fn is_playing_back(&self) -> bool {
        self.player.is_playing()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    // Device state

    pub fn keyboard(&self) -> &KeyboardState {
        &self.device.keyboard
    }

    pub fn mouse(&self) -> &MouseState {
        &self.device.mouse
    }
}

impl CommandSink for CommandDispatcher {
    fn queue_command(&mut self, command: Command) {
        self.queue.push(command);
    }
}
