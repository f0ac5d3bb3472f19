//! Connection state and statistics

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};

/// Where the transport thread is in its connect cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Authenticating,
    Joining,
    Connected,
    /// Waiting out the reconnect delay after a failed attempt
    Reconnecting,
    /// Thread exited after an explicit stop
    Stopped,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Joining => "joining",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Snapshot of transport statistics
#[derive(Debug, Clone, Default)]
pub struct ChatStats {
    pub state: ConnectionState,
    pub is_connected: bool,
    /// Wall-clock time of the last successful connect
    pub connected_at: Option<DateTime<Utc>>,
    /// Monotonic time of the last successful connect
    pub connected_since: Option<Instant>,
    /// Complete lines received from the server
    pub messages_received: u64,
    /// Lines recognized as commands and pushed into the buffer
    pub commands_received: u64,
    /// Retries after a failed attempt
    pub reconnection_count: u64,
    pub failed_connects: u64,
    /// Commands overwritten in the buffer before they were read
    pub commands_evicted: u64,
}
