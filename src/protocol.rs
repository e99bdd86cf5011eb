//! Line protocol shared by both ends of a chat session.
//!
//! The wire carries raw newline-terminated lines with no length prefix and
//! no escaping. Two line values are reserved as sentinels:
//! - `xx\n` ends the session, from either side
//! - `x\n` ends the sender's turn and hands the write turn to the peer
//!
//! Every other line is an ordinary message.

use bytes::{BufMut, Bytes, BytesMut};
use std::borrow::Cow;
use std::fmt;

/// Maximum payload bytes in a single line (excluding the newline).
pub const MAX_PAYLOAD: usize = 80;

/// Maximum bytes in a single line on the wire, delimiter included.
pub const MAX_LINE: usize = MAX_PAYLOAD + 1;

/// Session terminator.
pub const TERMINATE: &[u8] = b"xx\n";

/// Turn hand-off.
pub const YIELD: &[u8] = b"x\n";

/// Classification of a line for the turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Terminate,
    Yield,
    Message,
}

/// A single protocol line.
#[derive(Clone, PartialEq, Eq)]
pub struct Line(Bytes);

impl Line {
    /// The session terminator sentinel.
    pub fn terminate() -> Self {
        Line(Bytes::from_static(TERMINATE))
    }

    /// The turn hand-off sentinel.
    #[cfg(test)]
    pub fn yield_turn() -> Self {
        Line(Bytes::from_static(YIELD))
    }

    /// Build an outgoing line from local operator input.
    ///
    /// End of input, or input that stopped before its newline, becomes the
    /// terminator.
    pub fn from_input(input: Option<String>) -> Self {
        match input {
            Some(text) if text.ends_with('\n') && text.len() <= MAX_LINE => {
                Line(Bytes::from(text))
            }
            Some(text) if text.ends_with('\n') => Line::bounded(&text),
            _ => Line::terminate(),
        }
    }

    /// Wrap bytes exactly as they arrived from the peer.
    pub fn from_wire(bytes: Bytes) -> Self {
        Line(bytes)
    }

    /// Build a newline-terminated line from text, truncating the payload to
    /// `MAX_PAYLOAD` bytes at a character boundary.
    pub fn bounded(text: &str) -> Self {
        let payload = text.strip_suffix('\n').unwrap_or(text);
        let payload = truncate_at_boundary(payload, MAX_PAYLOAD);
        let mut out = String::with_capacity(payload.len() + 1);
        out.push_str(payload);
        out.push('\n');
        Line(Bytes::from(out))
    }

    /// Build `prefix` followed by the raw payload of `line`, byte for byte.
    ///
    /// The payload is cut at `MAX_PAYLOAD` bytes and a newline appended.
    pub fn prefixed(prefix: &str, line: &Line) -> Self {
        let payload = line.0.strip_suffix(b"\n").unwrap_or(&line.0[..]);
        let mut out = BytesMut::with_capacity(prefix.len() + payload.len() + 1);
        out.put_slice(prefix.as_bytes());
        out.put_slice(payload);
        out.truncate(MAX_PAYLOAD);
        out.put_u8(b'\n');
        Line(out.freeze())
    }

    pub fn kind(&self) -> LineKind {
        match &self.0[..] {
            TERMINATE => LineKind::Terminate,
            YIELD => LineKind::Yield,
            _ => LineKind::Message,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lossy text view for display.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?})", self.text())
    }
}

/// Split a raw console line into wire-sized lines.
///
/// Each piece carries at most `MAX_PAYLOAD` bytes and its own newline. When
/// the input had no trailing newline the last piece is left without one.
pub fn split_input(raw: &str) -> Vec<String> {
    let (payload, terminated) = match raw.strip_suffix('\n') {
        Some(p) => (p, true),
        None => (raw, false),
    };

    let mut pieces = Vec::new();
    let mut rest = payload;
    loop {
        let head = truncate_at_boundary(rest, MAX_PAYLOAD);
        rest = &rest[head.len()..];
        if rest.is_empty() {
            let mut last = head.to_string();
            if terminated {
                last.push('\n');
            }
            pieces.push(last);
            break;
        }
        pieces.push(format!("{head}\n"));
    }
    pieces
}

fn truncate_at_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Which side of the connection this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Connects out and writes first ("client").
    Initiator,
    /// Listens, reads first and auto-replies ("server").
    Responder,
}

impl Role {
    /// Initiator always holds the first write turn.
    pub fn first_turn(self) -> Turn {
        match self {
            Role::Initiator => Turn::Write,
            Role::Responder => Turn::Read,
        }
    }

    /// Label for lines typed locally.
    pub fn local_label(self) -> &'static str {
        match self {
            Role::Initiator => "You>",
            Role::Responder => "Server>",
        }
    }

    /// Label for lines received from the peer.
    pub fn peer_label(self) -> &'static str {
        match self {
            Role::Initiator => "Server>",
            Role::Responder => "Client>",
        }
    }

    /// Label for policy replies sent during a read turn.
    pub fn reply_label(self) -> &'static str {
        match self {
            Role::Initiator => "You auto-reply:",
            Role::Responder => "Server auto-reply:",
        }
    }

    /// How notices refer to the other end.
    pub fn peer_name(self) -> &'static str {
        match self {
            Role::Initiator => "Server",
            Role::Responder => "Client",
        }
    }
}

/// The two macro-states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Write,
    Read,
}
