//! Wire format for the chat connection
//!
//! A small subset of a line-oriented IRC-style protocol. Every line is
//! terminated by CRLF.
//!
//! Outbound:
//!
//! ```text
//! NICK <nick>
//! USER <nick> 0 * :<nick>
//! JOIN #<channel>
//! PONG<suffix of the PING line>
//! ```
//!
//! Inbound, only two shapes matter:
//!
//! ```text
//! PING :tmi.twitch.tv
//! :<user>!<ident> PRIVMSG #<channel> :<text>
//! ```
//!
//! Anything else is ignored.

use super::ChatCommand;

/// Line terminator on the wire
pub const CRLF: &[u8] = b"\r\n";

/// Prefix character every channel name carries on the wire
pub const CHANNEL_PREFIX: char = '#';

/// Classified inbound line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerLine<'a> {
    /// Keepalive probe; `suffix` is everything after `PING`
    Ping { suffix: &'a str },
    /// A well-formed chat message
    Privmsg(Privmsg<'a>),
    /// Anything else, including malformed chat messages
    Other,
}

/// Fields of a chat message line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Privmsg<'a> {
    pub user: &'a str,
    pub channel: &'a str,
    pub text: &'a str,
}

/// Classify a single line (without its CRLF)
pub fn classify(line: &str) -> ServerLine<'_> {
    if let Some(suffix) = line.strip_prefix("PING") {
        return ServerLine::Ping { suffix };
    }
    if line.contains(" PRIVMSG ") {
        if let Some(msg) = parse_privmsg(line) {
            return ServerLine::Privmsg(msg);
        }
    }
    ServerLine::Other
}

/// Parse `:<user>!<ident> PRIVMSG #<channel> :<text>`.
///
/// Every field must be non-empty; `ident` and `channel` may not contain
/// spaces.
pub fn parse_privmsg(line: &str) -> Option<Privmsg<'_>> {
    let rest = line.strip_prefix(':')?;
    let (user, rest) = rest.split_once('!')?;
    let (ident, rest) = rest.split_once(' ')?;
    let rest = rest.strip_prefix("PRIVMSG ")?;
    let rest = rest.strip_prefix(CHANNEL_PREFIX)?;
    let (channel, rest) = rest.split_once(' ')?;
    let text = rest.strip_prefix(':')?;

    if user.is_empty() || ident.is_empty() || channel.is_empty() || text.is_empty() {
        return None;
    }
    Some(Privmsg {
        user,
        channel,
        text,
    })
}

/// Split a chat message into `(command, parameters)` if it starts with `prefix`.
///
/// The command is the first whitespace-delimited word after the prefix,
/// lowercased. Parameters are the remainder after that word with a single
/// separating space removed. A bare prefix with no word is not a command.
pub fn parse_command(text: &str, prefix: char) -> Option<(String, String)> {
    let body = text.strip_prefix(prefix)?.trim_start();
    let end = body.find(char::is_whitespace).unwrap_or(body.len());
    let (word, rest) = body.split_at(end);
    if word.is_empty() {
        return None;
    }
    let parameters = rest.strip_prefix(' ').unwrap_or(rest);
    Some((word.to_ascii_lowercase(), parameters.to_string()))
}

/// Parse a raw chat line straight into a [`ChatCommand`]
pub fn parse_chat_command(line: &str, prefix: char) -> Option<ChatCommand> {
    let msg = parse_privmsg(line)?;
    let (command, parameters) = parse_command(msg.text, prefix)?;
    Some(ChatCommand::new(msg.user, command, parameters))
}

/// Channel name with the wire prefix added if missing
pub fn normalize_channel(channel: &str) -> String {
    if channel.starts_with(CHANNEL_PREFIX) {
        channel.to_string()
    } else {
        format!("{CHANNEL_PREFIX}{channel}")
    }
}

pub fn nick_line(nick: &str) -> String {
    format!("NICK {nick}")
}

pub fn user_line(nick: &str) -> String {
    format!("USER {nick} 0 * :{nick}")
}

pub fn join_line(channel: &str) -> String {
    format!("JOIN {}", normalize_channel(channel))
}

pub fn pong_line(ping_suffix: &str) -> String {
    format!("PONG{ping_suffix}")
}

/// Longest line kept by [`LineBuffer`], terminator excluded.
///
/// IRC caps lines at 512 bytes; chat services with tags send more.
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Accumulates received bytes and yields complete CRLF-terminated lines.
///
/// Lines longer than [`MAX_LINE_LENGTH`] are dropped whole, so pending data
/// never grows past the cap however long a peer goes without a terminator.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    /// Bytes of `pending` already searched for a terminator
    scanned: usize,
    /// Inside an oversized line; everything up to the next CRLF is dropped
    discarding: bool,
    discarded: u64,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        if self.pending.len() > MAX_LINE_LENGTH && self.find_terminator().is_none() {
            self.drop_partial_line();
        }
    }

    /// Next complete line without its terminator. Empty lines are skipped.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let Some(end) = self.find_terminator() else {
                if self.pending.len() > MAX_LINE_LENGTH {
                    self.drop_partial_line();
                }
                return None;
            };
            let line: Vec<u8> = self.pending.drain(..end + CRLF.len()).take(end).collect();
            self.scanned = 0;

            if std::mem::take(&mut self.discarding) {
                continue;
            }
            if line.len() > MAX_LINE_LENGTH {
                self.discarded += 1;
                continue;
            }
            if !line.is_empty() {
                return Some(String::from_utf8_lossy(&line).into_owned());
            }
        }
    }

    /// Offset of the first CRLF, resuming where the last search stopped
    fn find_terminator(&mut self) -> Option<usize> {
        // back up one byte in case a CR was the last byte searched
        let start = self.scanned.saturating_sub(CRLF.len() - 1);
        let found = self.pending[start..]
            .windows(CRLF.len())
            .position(|window| window == CRLF)
            .map(|i| start + i);
        if found.is_none() {
            self.scanned = self.pending.len();
        }
        found
    }

    /// Throw away an unterminated line that outgrew the cap
    fn drop_partial_line(&mut self) {
        if !self.discarding {
            self.discarding = true;
            self.discarded += 1;
        }
        // a trailing CR may be the first half of the terminator
        let keep = usize::from(self.pending.last() == Some(&b'\r'));
        self.pending.drain(..self.pending.len() - keep);
        self.scanned = 0;
    }

    /// Bytes received that do not yet form a complete line
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Lines dropped for exceeding [`MAX_LINE_LENGTH`]
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.scanned = 0;
        self.discarding = false;
    }
}
