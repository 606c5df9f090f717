//! Message protocol definitions
//!
//! Plain-text protocol. Inbound frames look like `[TAG]content` or the bare
//! word `bye`; outbound notifications are newline-terminated lines.
//!
//! ```text
//! name-msg      = "[NAME]" display-name
//! broadcast-msg = "[BROADCAST]" content
//! dm-msg        = "[DM:" display-name "]" content
//! leave-msg     = "bye"
//! ```

use std::fmt;

use crate::error::ProtocolError;

const LEAVE: &str = "bye";
const NAME_PREFIX: &str = "[NAME]";
const BROADCAST_PREFIX: &str = "[BROADCAST]";
const DM_PREFIX: &str = "[DM:";

/// Client → Server command, decoded from one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set display name
    SetName(String),
    /// Send to every connected client
    Broadcast(String),
    /// Send to the first client with a matching display name
    DirectMessage { target: String, content: String },
    /// End the session
    Leave,
    /// Anything else
    Malformed(ProtocolError),
}

impl Command {
    /// Decode a single frame
    pub fn parse(input: &str) -> Self {
        if input == LEAVE {
            return Command::Leave;
        }

        let Some((prefix, content)) = split_prefix(input) else {
            return Command::Malformed(ProtocolError::InvalidFormat);
        };

        if prefix == NAME_PREFIX {
            Command::SetName(content.to_string())
        } else if prefix == BROADCAST_PREFIX {
            Command::Broadcast(content.to_string())
        } else if let Some(target) = prefix.strip_prefix(DM_PREFIX) {
            Command::DirectMessage {
                target: target.strip_suffix(']').unwrap_or(target).to_string(),
                content: content.to_string(),
            }
        } else {
            Command::Malformed(ProtocolError::UnrecognizedPrefix)
        }
    }
}

/// Split `[xxxx]yyyy` into `("[xxxx]", "yyyy")` at the first `]`
fn split_prefix(input: &str) -> Option<(&str, &str)> {
    if input.len() < 2 || !input.starts_with('[') {
        return None;
    }
    let end = input.find(']')?;
    Some(input.split_at(end + 1))
}

/// Split one read's worth of text into frames
///
/// Pieces are separated by `\n` (an optional trailing `\r` is dropped) and
/// empty pieces are skipped. Text without a newline is a single frame.
pub fn split_frames(chunk: &str) -> impl Iterator<Item = &str> {
    chunk
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
}

/// Turn console shorthand into a protocol frame (client side)
///
/// - `b:Hello everyone` → `[BROADCAST]Hello everyone`
/// - `d:Bob:Hi Bob!` → `[DM:Bob]Hi Bob!`
///
/// Anything else is returned unchanged.
pub fn encode_user_input(input: &str) -> String {
    if let Some(rest) = input.strip_prefix("b:") {
        return format!("{BROADCAST_PREFIX}{rest}");
    }

    if let Some(rest) = input.strip_prefix("d:") {
        if let Some((user, content)) = rest.split_once(':') {
            return format!("{DM_PREFIX}{user}]{content}");
        }
    }

    input.to_string()
}

/// Server → Client notification
///
/// The wire text is the `Display` rendering, always newline-terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Broadcast relay
    Relay { from: String, content: String },
    /// Direct message relay
    Private { from: String, content: String },
    /// A client set its name
    Joined { name: String },
    /// A named client disconnected
    Left { name: String },
    /// Protocol error, sent to the offending client only
    Error(ProtocolError),
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Relay { from, content } => writeln!(f, "{from}: {content}"),
            ServerMessage::Private { from, content } => {
                writeln!(f, "[PM from {from}] {content}")
            }
            ServerMessage::Joined { name } => writeln!(f, "{name} has joined the chat."),
            ServerMessage::Left { name } => writeln!(f, "{name} has left."),
            ServerMessage::Error(err) => writeln!(f, "[SERVER] {err}"),
        }
    }
}

impl From<ProtocolError> for ServerMessage {
    fn from(err: ProtocolError) -> Self {
        ServerMessage::Error(err)
    }
}
