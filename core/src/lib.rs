//! Funhouse Core - Command pipeline for the falling-sand sandbox
//!
//! Input from the keyboard, the mouse, a live chat channel and recorded
//! sessions all becomes [`Command`]s, which a [`CommandDispatcher`] executes
//! in order against the host's grid.
//!
//! # Architecture
//!
//! - [`chat`] - Background chat transport, command buffer and chat-to-command adapter
//! - [`input`] - Input events, prioritized contexts and default key bindings
//! - [`dispatch`] - The command queue and the router that fills it
//! - [`replay`] - Session recording and timed playback
//! - [`sandbox`] - Built-in commands and the host-facing [`Sandbox`]
//! - [`config`] - TOML configuration in the platform config directory

pub mod chat;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod input;
pub mod replay;
pub mod sandbox;

pub use command::{ChatOrigin, Command, CommandContext, CommandEffect, CommandSink, SessionRequest};
pub use config::{ChatConfig, Config, ConfigError, SandboxConfig};
pub use dispatch::CommandDispatcher;
pub use sandbox::{Sandbox, SandboxState, SandboxStats};
