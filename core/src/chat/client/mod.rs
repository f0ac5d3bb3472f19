//! Reconnecting chat client running on its own thread

mod stats;
#[cfg(test)]
mod tests;
mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use super::{ChatError, CommandBuffer};
use crate::config::ChatConfig;
use worker::Worker;

pub use stats::{ChatStats, ConnectionState};

/// Chat connection owning a private transport thread.
///
/// The thread connects, logs in anonymously, joins the configured channel,
/// answers keepalive probes and pushes every recognized `!command` into the
/// shared [`CommandBuffer`]. Connection failures are retried after a fixed
/// delay when `auto_reconnect` is set.
///
/// # Example
///
/// ```rust,no_run
/// use funhouse_core::chat::ChatClient;
/// use funhouse_core::config::ChatConfig;
///
/// let mut client = ChatClient::new(ChatConfig::default());
/// client.start()?;
///
/// // once per tick
/// for cmd in client.command_buffer().get_new_commands() {
///     println!("{} -> !{} {}", cmd.username, cmd.command, cmd.parameters);
/// }
///
/// client.stop();
/// # Ok::<(), funhouse_core::chat::ChatError>(())
/// ```
pub struct ChatClient {
    config: ChatConfig,
    buffer: Arc<CommandBuffer>,
    connected: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    stats: Arc<Mutex<ChatStats>>,
    thread: Option<JoinHandle<()>>,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Self {
        let buffer = Arc::new(CommandBuffer::new(config.buffer_capacity));
        Self {
            config,
            buffer,
            connected: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(Mutex::new(ChatStats::default())),
            thread: None,
        }
    }

    /// Spawn the transport thread. Returns immediately.
    ///
    /// # Errors
    ///
    /// [`ChatError::AlreadyRunning`] if the thread is already running, or
    /// [`ChatError::Spawn`] if the OS refused to create it.
    pub fn start(&mut self) -> Result<(), ChatError> {
        if self.thread.is_some() {
            tracing::warn!("Chat client already running");
            return Err(ChatError::AlreadyRunning);
        }

        self.stop.store(false, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);

        let worker = Worker::new(
            self.config.clone(),
            self.buffer.clone(),
            self.connected.clone(),
            self.stop.clone(),
            self.stats.clone(),
        );
        let handle = thread::Builder::new()
            .name("chat-transport".to_string())
            .spawn(move || worker.run())
            .map_err(ChatError::Spawn)?;

        self.thread = Some(handle);
        tracing::info!(channel = %self.config.channel_name(), "Starting chat client thread");
        Ok(())
    }

    /// Signal the thread to stop and wait for it. Safe to call repeatedly.
    ///
    /// Once this returns the thread no longer writes to the buffer.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);

        if let Some(handle) = self.thread.take() {
            tracing::info!("Stopping chat client...");
            if handle.join().is_err() {
                tracing::error!("Chat thread panicked");
            }
        }

        self.connected.store(false, Ordering::SeqCst);
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        stats.is_connected = false;
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Lock-free connection snapshot
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn command_buffer(&self) -> &CommandBuffer {
        &self.buffer
    }

    /// Consumer-side view handed to a [`ChatCommandAdapter`](super::ChatCommandAdapter)
    pub fn handle(&self) -> ChatHandle {
        ChatHandle {
            buffer: self.buffer.clone(),
            connected: self.connected.clone(),
        }
    }

    pub fn stats(&self) -> ChatStats {
        let mut stats = self
            .stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        stats.is_connected = self.is_connected();
        stats.commands_evicted = self.buffer.evicted();
        stats
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read side of a chat connection: its buffer and connection flag.
///
/// This is all the simulation thread ever touches.
#[derive(Debug, Clone)]
pub struct ChatHandle {
    buffer: Arc<CommandBuffer>,
    connected: Arc<AtomicBool>,
}

impl ChatHandle {
    /// A handle over a buffer that no transport feeds. Reports disconnected.
    pub fn detached(buffer: Arc<CommandBuffer>) -> Self {
        Self {
            buffer,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn buffer(&self) -> &CommandBuffer {
        &self.buffer
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}
