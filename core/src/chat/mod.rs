//! Chat integration
//!
//! A line-oriented chat connection (anonymous IRC-style login) runs on its own
//! thread and feeds parsed `!commands` into a shared [`CommandBuffer`]. The
//! tick loop drains that buffer through a [`ChatCommandAdapter`], which turns
//! each entry into a [`Command`](crate::Command).
//!
//! ```text
//!   transport thread                │  simulation thread
//!                                   │
//!   ChatClient ──► CommandBuffer ───┼──► ChatCommandAdapter::update()
//!   (connect, PING/PONG, parse)     │        │
//!                                   │        ▼
//!                                   │    CommandSink (dispatcher queue)
//! ```
//!
//! The buffer is the only object shared between the two threads.

mod adapter;
mod buffer;
mod client;
mod error;
pub mod protocol;

use std::time::Instant;

pub use adapter::{ChatCallback, ChatCommandAdapter, ChatCommandFactory};
pub use buffer::{CommandBuffer, DEFAULT_BUFFER_CAPACITY};
pub use client::{ChatClient, ChatHandle, ChatStats, ConnectionState};
pub use error::ChatError;

/// A chat message recognized as a command.
///
/// `command` is lowercased with the prefix stripped; `parameters` is the rest
/// of the message after the command word and one separating space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCommand {
    pub username: String,
    pub command: String,
    pub parameters: String,
    pub timestamp: Instant,
}

impl ChatCommand {
    /// Create a command stamped with the current instant
    pub fn new(
        username: impl Into<String>,
        command: impl Into<String>,
        parameters: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            command: command.into(),
            parameters: parameters.into(),
            timestamp: Instant::now(),
        }
    }
}
