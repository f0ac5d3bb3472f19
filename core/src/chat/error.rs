//! Error types for the chat transport

use std::io;

/// Chat transport error
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// `start()` was called while the transport thread is running
    #[error("chat client is already running")]
    AlreadyRunning,
    /// The transport thread could not be spawned
    #[error("failed to spawn chat thread: {0}")]
    Spawn(#[source] io::Error),
    /// Host name lookup failed
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    /// Host name resolved to no usable address
    #[error("{host} resolved to no addresses")]
    NoAddress { host: String },
    /// No resolved address accepted the connection within the timeout
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    /// Writing a line to the server failed
    #[error("send failed: {0}")]
    Send(#[source] io::Error),
    /// The server closed the connection
    #[error("connection closed by server")]
    Closed,
    /// A stop request arrived while a connect attempt was in progress
    #[error("chat client stopped during connect")]
    Stopped,
    #[error(transparent)]
    Io(#[from] io::Error),
}
