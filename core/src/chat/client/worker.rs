//! Transport loop executed on the chat thread

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;

use super::{ChatStats, ConnectionState};
use crate::chat::protocol::{self, CRLF, LineBuffer, ServerLine};
use crate::chat::{ChatCommand, ChatError, CommandBuffer};
use crate::config::ChatConfig;

/// Pause between polls of the non-blocking socket
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Bound on a single TCP connect attempt
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a write may keep hitting `WouldBlock` before giving up
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Granularity of the reconnect sleep, so a stop request is seen promptly
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(50);

const RECV_BUFFER_SIZE: usize = 4096;

struct Connection {
    stream: TcpStream,
    lines: LineBuffer,
    last_activity: Instant,
}

impl Connection {
    fn send_line(&mut self, line: &str) -> Result<(), ChatError> {
        let mut data = Vec::with_capacity(line.len() + CRLF.len());
        data.extend_from_slice(line.as_bytes());
        data.extend_from_slice(CRLF);

        let deadline = Instant::now() + SEND_TIMEOUT;
        let mut written = 0;
        while written < data.len() {
            match self.stream.write(&data[written..]) {
                Ok(0) => return Err(ChatError::Closed),
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if e.kind() == ErrorKind::WouldBlock && Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(1));
                }
                Err(e) => return Err(ChatError::Send(e)),
            }
        }
        Ok(())
    }
}

pub(super) struct Worker {
    config: ChatConfig,
    buffer: Arc<CommandBuffer>,
    connected: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    stats: Arc<Mutex<ChatStats>>,
    connection: Option<Connection>,
    /// Set after a failed connect with auto-reconnect off
    idle: bool,
}

impl Worker {
    pub(super) fn new(
        config: ChatConfig,
        buffer: Arc<CommandBuffer>,
        connected: Arc<AtomicBool>,
        stop: Arc<AtomicBool>,
        stats: Arc<Mutex<ChatStats>>,
    ) -> Self {
        Self {
            config,
            buffer,
            connected,
            stop,
            stats,
            connection: None,
            idle: false,
        }
    }

    pub(super) fn run(mut self) {
        tracing::info!("Chat thread started");

        while !self.stopping() {
            if self.connection.is_some() {
                self.poll(Instant::now());
                thread::sleep(POLL_INTERVAL);
                continue;
            }

            if self.idle {
                thread::sleep(POLL_INTERVAL);
                continue;
            }

            match self.connect() {
                Ok(connection) => {
                    self.connection = Some(connection);
                    self.connected.store(true, Ordering::Release);
                    self.update_stats(|stats| {
                        stats.state = ConnectionState::Connected;
                        stats.is_connected = true;
                        stats.connected_at = Some(Utc::now());
                        stats.connected_since = Some(Instant::now());
                    });
                    tracing::info!(channel = %self.config.channel_name(), "Connected to chat");
                }
                Err(ChatError::Stopped) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Chat connection failed");
                    self.update_stats(|stats| stats.failed_connects += 1);

                    if self.config.auto_reconnect {
                        let delay = self.config.reconnect_delay();
                        self.set_state(ConnectionState::Reconnecting);
                        tracing::info!(delay_secs = delay.as_secs(), "Reconnecting after delay");
                        self.sleep_unless_stopped(delay);
                        self.update_stats(|stats| stats.reconnection_count += 1);
                    } else {
                        self.set_state(ConnectionState::Disconnected);
                        self.idle = true;
                        tracing::info!("Auto-reconnect disabled, chat thread idle until stopped");
                    }
                }
            }
        }

        self.disconnect();
        self.set_state(ConnectionState::Stopped);
        tracing::info!("Chat thread terminated");
    }

    fn stopping(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn connect(&mut self) -> Result<Connection, ChatError> {
        self.disconnect();
        self.set_state(ConnectionState::Connecting);
        tracing::info!(server = %self.config.server, port = self.config.port, "Connecting to chat server");

        let stream = open_stream(&self.config.server, self.config.port)?;
        if self.stopping() {
            let _ = stream.shutdown(Shutdown::Both);
            return Err(ChatError::Stopped);
        }
        stream.set_nonblocking(true).map_err(ChatError::Io)?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
        }

        let mut connection = Connection {
            stream,
            lines: LineBuffer::new(),
            last_activity: Instant::now(),
        };

        self.set_state(ConnectionState::Authenticating);
        connection.send_line(&protocol::nick_line(&self.config.nickname))?;
        connection.send_line(&protocol::user_line(&self.config.nickname))?;

        self.set_state(ConnectionState::Joining);
        connection.send_line(&protocol::join_line(&self.config.channel))?;

        Ok(connection)
    }

    fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.stream.shutdown(Shutdown::Both);
            tracing::info!("Disconnected from chat server");
        }
        self.connected.store(false, Ordering::Release);
        self.update_stats(|stats| {
            stats.is_connected = false;
            if stats.state == ConnectionState::Connected {
                stats.state = ConnectionState::Disconnected;
            }
        });
    }

    /// One non-blocking read plus keepalive bookkeeping
    fn poll(&mut self, now: Instant) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };

        let discarded_before = connection.lines.discarded();
        let mut chunk = [0u8; RECV_BUFFER_SIZE];
        match connection.stream.read(&mut chunk) {
            Ok(0) => {
                tracing::warn!("Chat server closed the connection");
                self.disconnect();
                return;
            }
            Ok(n) => connection.lines.extend(&chunk[..n]),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Chat receive failed");
                self.disconnect();
                return;
            }
        }

        let mut lines = Vec::new();
        while let Some(line) = connection.lines.next_line() {
            lines.push(line);
        }
        if !lines.is_empty() {
            connection.last_activity = now;
        }
        if connection.lines.discarded() > discarded_before {
            tracing::warn!(
                max_len = protocol::MAX_LINE_LENGTH,
                "Dropped oversized line from chat server"
            );
        }
        let idle_for = now.saturating_duration_since(connection.last_activity);

        for line in &lines {
            if let Err(e) = self.handle_line(line) {
                tracing::warn!(error = %e, "Chat send failed");
                self.disconnect();
                return;
            }
        }

        if idle_for > self.config.ping_timeout() {
            tracing::warn!(idle_secs = idle_for.as_secs(), "No traffic from chat server, reconnecting");
            self.disconnect();
        }
    }

    fn handle_line(&mut self, line: &str) -> Result<(), ChatError> {
        self.update_stats(|stats| stats.messages_received += 1);

        match protocol::classify(line) {
            ServerLine::Ping { suffix } => {
                tracing::trace!("PING received");
                if let Some(connection) = self.connection.as_mut() {
                    connection.send_line(&protocol::pong_line(suffix))?;
                }
            }
            ServerLine::Privmsg(msg) => {
                if let Some((command, parameters)) =
                    protocol::parse_command(msg.text, self.config.command_prefix)
                {
                    tracing::debug!(user = msg.user, %command, %parameters, "Chat command");
                    self.buffer
                        .add_command(ChatCommand::new(msg.user, command, parameters));
                    self.update_stats(|stats| stats.commands_received += 1);
                }
            }
            ServerLine::Other => tracing::trace!(line, "Ignoring server line"),
        }

        Ok(())
    }

    fn sleep_unless_stopped(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.stopping() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(STOP_CHECK_INTERVAL.min(deadline - now));
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.update_stats(|stats| stats.state = state);
    }

    fn update_stats(&self, f: impl FnOnce(&mut ChatStats)) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut stats);
    }
}

/// Resolve `host` and connect to the first address that answers in time
fn open_stream(host: &str, port: u16) -> Result<TcpStream, ChatError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| ChatError::Resolve {
            host: host.to_string(),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(ChatError::NoAddress {
            host: host.to_string(),
        });
    }

    let mut last_error = io::Error::from(ErrorKind::AddrNotAvailable);
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!(%addr, error = %e, "Connect attempt failed");
                last_error = e;
            }
        }
    }

    Err(ChatError::Connect {
        host: host.to_string(),
        port,
        source: last_error,
    })
}
