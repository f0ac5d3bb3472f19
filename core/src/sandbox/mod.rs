//! Host-facing sandbox controls
//!
//! [`Sandbox`] bundles the dispatcher, the tool state and the optional chat
//! integration behind the interface a game loop needs:
//!
//! ```rust,no_run
//! use funhouse_core::sandbox::Sandbox;
//! use funhouse_shared::VecGrid;
//!
//! let mut sandbox = Sandbox::new(&funhouse_core::config::load());
//! let mut grid = VecGrid::new(200, 150);
//!
//! loop {
//!     // feed window events with sandbox.process_window_event(..)
//!     sandbox.update();
//!     sandbox.execute_commands(Some(&mut grid));
//! #   break;
//! }
//! ```

mod chat_commands;
pub mod commands;
mod state;

use std::time::Instant;

use funhouse_shared::{Grid, Material};
use winit::event::WindowEvent;

use crate::chat::{ChatClient, ChatCommandAdapter, ChatError, ChatStats};
use crate::command::{Command, CommandContext};
use crate::config::{ChatConfig, Config};
use crate::dispatch::CommandDispatcher;
use crate::input::{InputConfig, InputContext, InputEvent, KeyBindings, Modifiers};

pub use chat_commands::{BUILTIN_COMMANDS, register_builtin_commands};
pub use state::{BRUSH_STEP, DEFAULT_BRUSH_SIZE, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE, SandboxState};

/// Name of the context holding the default key bindings
pub const SANDBOX_CONTEXT: &str = "sandbox";

struct ChatIntegration {
    client: ChatClient,
    adapter: ChatCommandAdapter,
}

/// Snapshot of the sandbox for status displays
#[derive(Debug, Clone)]
pub struct SandboxStats {
    pub queued_commands: usize,
    pub is_recording: bool,
    pub recorded_commands: usize,
    pub is_playing_back: bool,
    pub playback_progress: f32,
    pub selected_material: Material,
    pub brush_size: i32,
    /// Present while chat integration is enabled
    pub chat: Option<ChatStats>,
}

pub struct Sandbox {
    dispatcher: CommandDispatcher,
    state: SandboxState,
    input: InputConfig,
    chat: Option<ChatIntegration>,
    /// Grid cell of the previous draw while a button is held
    last_draw: Option<(i32, i32)>,
}

impl Sandbox {
    /// Sandbox with default bindings installed from `config`.
    ///
    /// Chat stays off until [`enable_chat_integration`](Self::enable_chat_integration).
    pub fn new(config: &Config) -> Self {
        let mut sandbox = Self {
            dispatcher: CommandDispatcher::new(),
            state: SandboxState::from_config(&config.sandbox),
            input: config.input.clone(),
            chat: None,
            last_draw: None,
        };
        sandbox.install_default_bindings();
        sandbox
    }

    fn install_default_bindings(&mut self) {
        let context = default_context(&self.input.bindings);
        self.dispatcher.add_context(context);
    }

    pub fn process_event(&mut self, event: &InputEvent) -> bool {
        self.dispatcher.process_event(event, &mut self.state)
    }

    pub fn process_window_event(&mut self, event: &WindowEvent) -> bool {
        self.dispatcher.process_window_event(event, &mut self.state)
    }

    /// Per-tick update: poll chat, clear input transitions, advance playback
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    pub fn update_at(&mut self, now: Instant) {
        if let Some(chat) = &mut self.chat {
            chat.adapter.update(&mut self.dispatcher);
        }
        self.dispatcher.update_at(now);
    }

    /// Execute everything queued against `grid`. Returns the number executed.
    pub fn execute_commands(&mut self, grid: Option<&mut dyn Grid>) -> usize {
        let grid = grid.map(|grid| grid as &mut dyn Grid);
        let mut ctx = CommandContext::new(grid, &mut self.state);
        self.dispatcher.execute_commands(&mut ctx)
    }

    pub fn queue_command(&mut self, command: Command) {
        self.dispatcher.queue_command(command);
    }

    /// Queue brush stamps for a pointer at window position `(x, y)`.
    ///
    /// `bounds` is the grid size. Successive calls while a button is held are
    /// joined with a line so fast strokes leave no gaps. Releasing both
    /// buttons ends the stroke.
    pub fn handle_mouse_draw(&mut self, x: f64, y: f64, left: bool, right: bool, bounds: (i32, i32)) {
        if !left && !right {
            self.last_draw = None;
            return;
        }

        let scale = f64::from(self.input.world_scale.max(1));
        let cell = ((x / scale).floor() as i32, (y / scale).floor() as i32);
        if cell.0 < 0 || cell.0 >= bounds.0 || cell.1 < 0 || cell.1 >= bounds.1 {
            return;
        }

        let cells = match self.last_draw {
            Some(previous) => commands::line_cells(previous, cell),
            None => vec![cell],
        };
        for (cx, cy) in cells {
            self.dispatcher.queue_command(commands::draw(
                cx,
                cy,
                self.state.brush_size,
                self.state.selected_material,
                right,
            ));
        }
        self.last_draw = Some(cell);
    }

    /// [`handle_mouse_draw`](Self::handle_mouse_draw) from the tracked mouse state
    pub fn draw_from_mouse(&mut self, bounds: (i32, i32)) {
        let mouse = *self.dispatcher.mouse();
        self.handle_mouse_draw(mouse.x, mouse.y, mouse.left, mouse.right, bounds);
    }

    /// Connect to chat and route its commands into the queue.
    ///
    /// Any previous integration is shut down first.
    pub fn enable_chat_integration(&mut self, config: ChatConfig) -> Result<(), ChatError> {
        self.disable_chat_integration();

        let mut client = ChatClient::new(config);
        client.start()?;

        let mut adapter = ChatCommandAdapter::new(Some(client.handle()));
        register_builtin_commands(&mut adapter);
        tracing::info!(channel = %client.config().channel_name(), "Chat integration enabled");

        self.chat = Some(ChatIntegration { client, adapter });
        Ok(())
    }

    pub fn disable_chat_integration(&mut self) {
        if let Some(mut chat) = self.chat.take() {
            chat.client.stop();
            tracing::info!("Chat integration disabled");
        }
    }

    pub fn is_chat_enabled(&self) -> bool {
        self.chat.is_some()
    }

    pub fn is_chat_connected(&self) -> bool {
        self.chat.as_ref().is_some_and(|chat| chat.adapter.is_connected())
    }

    /// Adapter of the active chat integration, for registering extra commands
    pub fn chat_adapter_mut(&mut self) -> Option<&mut ChatCommandAdapter> {
        self.chat.as_mut().map(|chat| &mut chat.adapter)
    }

    pub fn stats(&self) -> SandboxStats {
        SandboxStats {
            queued_commands: self.dispatcher.queue_len(),
            is_recording: self.dispatcher.is_recording(),
            recorded_commands: self.dispatcher.recorded_commands().len(),
            is_playing_back: self.dispatcher.is_playing_back(),
            playback_progress: self.dispatcher.player().progress(),
            selected_material: self.state.selected_material,
            brush_size: self.state.brush_size,
            chat: self.chat.as_ref().map(|chat| chat.client.stats()),
        }
    }

    pub fn state(&self) -> &SandboxState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SandboxState {
        &mut self.state
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut CommandDispatcher {
        &mut self.dispatcher
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// The `sandbox` context: material keys, clear, record/playback toggles and
/// brush size.
pub fn default_context(bindings: &KeyBindings) -> InputContext {
    let mut context = InputContext::new(SANDBOX_CONTEXT, 0);
    let none = Modifiers::empty();

    let materials = [
        (bindings.select_air, Material::Air),
        (bindings.select_sand, Material::Sand),
        (bindings.select_water, Material::Water),
        (bindings.select_stone, Material::Stone),
    ];
    for (key, material) in materials {
        context.bind_key_down(key, none, move |_, _| {
            Some(commands::select_material(material))
        });
    }

    context.bind_key_down(bindings.clear, none, |_, _| Some(commands::clear_world()));
    context.bind_key_down(bindings.toggle_recording, none, |_, _| {
        Some(commands::toggle_recording())
    });
    context.bind_key_down(bindings.toggle_playback, none, |_, _| {
        Some(commands::toggle_playback())
    });

    context.bind_key_down(bindings.brush_smaller, none, |_, state| {
        let size = state.shrink_brush();
        tracing::info!(size, "Brush size");
        None
    });
    context.bind_key_down(bindings.brush_larger, none, |_, state| {
        let size = state.grow_brush();
        tracing::info!(size, "Brush size");
        None
    });

    context
}
