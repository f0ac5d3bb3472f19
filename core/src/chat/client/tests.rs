//! Tests against a loopback fake chat server

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use super::*;

const WAIT: Duration = Duration::from_secs(5);

fn listener() -> TcpListener {
    TcpListener::bind("127.0.0.1:0").unwrap()
}

fn config_for(port: u16) -> ChatConfig {
    ChatConfig {
        enabled: true,
        channel: "sandbox".to_string(),
        server: "127.0.0.1".to_string(),
        port,
        nickname: "justinfan42".to_string(),
        command_prefix: '!',
        auto_reconnect: true,
        reconnect_delay_seconds: 0,
        ping_timeout_seconds: 300,
        buffer_capacity: 16,
    }
}

/// Accept one connection, giving up after `timeout`
fn accept_within(listener: &TcpListener, timeout: Duration) -> Option<TcpStream> {
    listener.set_nonblocking(true).unwrap();
    let deadline = Instant::now() + timeout;
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false).unwrap();
                stream.set_read_timeout(Some(WAIT)).unwrap();
                return Some(stream);
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                if Instant::now() > deadline {
                    return None;
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => panic!("accept failed: {e}"),
        }
    }
}

struct Peer {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Peer {
    fn accept(listener: &TcpListener) -> Self {
        let stream = accept_within(listener, WAIT).expect("client never connected");
        let writer = stream.try_clone().unwrap();
        Self {
            reader: BufReader::new(stream),
            writer,
        }
    }

    fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        line.trim_end_matches("\r\n").to_string()
    }

    fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).unwrap();
        self.writer.write_all(b"\r\n").unwrap();
        self.writer.flush().unwrap();
    }

    fn expect_handshake(&mut self) {
        assert_eq!(self.read_line(), "NICK justinfan42");
        assert_eq!(self.read_line(), "USER justinfan42 0 * :justinfan42");
        assert_eq!(self.read_line(), "JOIN #sandbox");
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

#[test]
fn test_handshake_and_connected() {
    let server = listener();
    let mut client = ChatClient::new(config_for(server.local_addr().unwrap().port()));
    client.start().unwrap();

    let mut peer = Peer::accept(&server);
    peer.expect_handshake();

    assert!(wait_until(|| client.is_connected()));
    let stats = client.stats();
    assert_eq!(stats.state, ConnectionState::Connected);
    assert!(stats.connected_at.is_some());
    assert!(stats.connected_since.is_some());

    client.stop();
    assert!(!client.is_connected());
    assert_eq!(client.stats().state, ConnectionState::Stopped);
}

#[test]
fn test_ping_answered_with_pong() {
    let server = listener();
    let mut client = ChatClient::new(config_for(server.local_addr().unwrap().port()));
    client.start().unwrap();

    let mut peer = Peer::accept(&server);
    peer.expect_handshake();

    peer.send("PING :tmi.twitch.tv");
    assert_eq!(peer.read_line(), "PONG :tmi.twitch.tv");

    client.stop();
}

#[test]
fn test_privmsg_commands_reach_buffer() {
    let server = listener();
    let mut client = ChatClient::new(config_for(server.local_addr().unwrap().port()));
    client.start().unwrap();

    let mut peer = Peer::accept(&server);
    peer.expect_handshake();

    peer.send(":tmi.twitch.tv 001 justinfan42 :Welcome");
    peer.send(":bob!bob@bob.tmi.twitch.tv PRIVMSG #sandbox :hello everyone");
    peer.send(":alice!alice@alice.tmi.twitch.tv PRIVMSG #sandbox :!Spawn sand 100 200");

    assert!(wait_until(|| client.stats().messages_received == 3));

    let commands = client.command_buffer().get_new_commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].username, "alice");
    assert_eq!(commands[0].command, "spawn");
    assert_eq!(commands[0].parameters, "sand 100 200");
    assert_eq!(client.stats().commands_received, 1);

    client.stop();
}

#[test]
fn test_handle_shares_buffer_and_connection() {
    let server = listener();
    let mut client = ChatClient::new(config_for(server.local_addr().unwrap().port()));
    let handle = client.handle();
    assert!(!handle.is_connected());

    client.start().unwrap();
    let mut peer = Peer::accept(&server);
    peer.expect_handshake();
    assert!(wait_until(|| handle.is_connected()));

    peer.send(":carol!c@c PRIVMSG #sandbox :!clear");
    assert!(wait_until(|| handle.buffer().size() == 1));

    client.stop();
    assert!(!handle.is_connected());
}

#[test]
fn test_start_twice_fails() {
    let server = listener();
    let mut client = ChatClient::new(config_for(server.local_addr().unwrap().port()));
    client.start().unwrap();
    assert!(matches!(client.start(), Err(ChatError::AlreadyRunning)));
    client.stop();
}

#[test]
fn test_stop_is_idempotent() {
    let mut client = ChatClient::new(config_for(1));
    client.stop();

    let server = listener();
    let mut client = ChatClient::new(config_for(server.local_addr().unwrap().port()));
    client.start().unwrap();
    client.stop();
    client.stop();
    assert!(!client.is_running());

    // restartable after a stop
    client.start().unwrap();
    assert!(client.is_running());
    client.stop();
}

#[test]
fn test_stop_closes_socket() {
    let server = listener();
    let mut client = ChatClient::new(config_for(server.local_addr().unwrap().port()));
    client.start().unwrap();

    let mut peer = Peer::accept(&server);
    peer.expect_handshake();
    assert!(wait_until(|| client.is_connected()));

    client.stop();

    let mut rest = String::new();
    assert_eq!(peer.reader.read_line(&mut rest).unwrap(), 0);
}

#[test]
fn test_reconnects_after_server_drop() {
    let server = listener();
    let mut client = ChatClient::new(config_for(server.local_addr().unwrap().port()));
    client.start().unwrap();

    let mut first = Peer::accept(&server);
    first.expect_handshake();
    assert!(wait_until(|| client.is_connected()));
    drop(first);

    let mut second = Peer::accept(&server);
    second.expect_handshake();
    assert!(wait_until(|| client.is_connected()));

    client.stop();
}

#[test]
fn test_keepalive_timeout_forces_reconnect() {
    let server = listener();
    let mut config = config_for(server.local_addr().unwrap().port());
    config.ping_timeout_seconds = 1;
    let mut client = ChatClient::new(config);
    client.start().unwrap();

    let mut first = Peer::accept(&server);
    first.expect_handshake();
    let connected_at = Instant::now();

    // stay silent; the client should give up on this connection
    let mut second = Peer::accept(&server);
    assert!(connected_at.elapsed() >= Duration::from_millis(900));
    second.expect_handshake();

    client.stop();
}

#[test]
fn test_failed_connect_without_reconnect_goes_idle() {
    let port = {
        let server = listener();
        server.local_addr().unwrap().port()
    };
    let mut config = config_for(port);
    config.auto_reconnect = false;

    let mut client = ChatClient::new(config);
    client.start().unwrap();

    assert!(wait_until(|| client.stats().failed_connects == 1));
    thread::sleep(Duration::from_millis(200));

    let stats = client.stats();
    assert_eq!(stats.failed_connects, 1);
    assert_eq!(stats.reconnection_count, 0);
    assert_eq!(stats.state, ConnectionState::Disconnected);
    assert!(client.is_running());

    client.stop();
    assert_eq!(client.stats().state, ConnectionState::Stopped);
}

#[test]
fn test_failed_connect_retries() {
    let port = {
        let server = listener();
        server.local_addr().unwrap().port()
    };
    let mut client = ChatClient::new(config_for(port));
    client.start().unwrap();

    assert!(wait_until(|| {
        let stats = client.stats();
        stats.failed_connects >= 2 && stats.reconnection_count >= 1
    }));

    client.stop();
}

#[test]
fn test_reconnect_waits_configured_delay() {
    let port = {
        let server = listener();
        server.local_addr().unwrap().port()
    };
    let mut config = config_for(port);
    config.reconnect_delay_seconds = 1;

    let mut client = ChatClient::new(config);
    client.start().unwrap();

    assert!(wait_until(|| client.stats().failed_connects >= 1));
    let first_failure = Instant::now();
    assert!(wait_until(|| client.stats().state == ConnectionState::Reconnecting));

    assert!(wait_until(|| client.stats().failed_connects >= 2));
    let gap = first_failure.elapsed();
    assert!(gap >= Duration::from_millis(900), "retried after {gap:?}");
    assert!(client.stats().reconnection_count >= 1);

    client.stop();
}
