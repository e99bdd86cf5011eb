//! Acknowledgment policy.
//!
//! Every ordinary line is answered with the acknowledgment template:
//!
//! ```text
//! Received: hello\n
//! Reply:    I got -> hello\n
//! ```

use crate::protocol::Line;
use crate::protocols::ReactionPolicy;

/// Text placed in front of an acknowledged line.
pub const ACK_PREFIX: &str = "I got -> ";

/// Build the acknowledgment for a received line. The peer's bytes are
/// echoed unmodified, whether or not they are valid UTF-8.
pub fn acknowledge(line: &Line) -> Line {
    Line::prefixed(ACK_PREFIX, line)
}

/// Acknowledges everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoOnly;

impl ReactionPolicy for EchoOnly {
    fn on_message(&mut self, line: &Line) -> Option<Line> {
        Some(acknowledge(line))
    }
}
