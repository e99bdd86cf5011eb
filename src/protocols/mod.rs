//! Reaction policies.
//!
//! A policy decides what, if anything, to send back when an ordinary line
//! arrives during a read turn. Sentinels never reach a policy.
//!
//! - `Passive`: display only (Initiator)
//! - `echo`: acknowledge every line (plain Responder)
//! - `commands`: slash commands with acknowledgment fallback (Responder)

pub mod commands;
pub mod echo;

pub use commands::CommandDispatch;
pub use echo::EchoOnly;

use crate::protocol::Line;

/// Role-specific reaction to an ordinary received line.
pub trait ReactionPolicy {
    /// Reply to send immediately, if any. Replies never end the turn.
    fn on_message(&mut self, line: &Line) -> Option<Line>;
}

/// Never replies.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passive;

impl ReactionPolicy for Passive {
    fn on_message(&mut self, _line: &Line) -> Option<Line> {
        None
    }
}

/// Policy chosen at session construction.
pub enum Policy<R> {
    Passive(Passive),
    Echo(EchoOnly),
    Commands(CommandDispatch<R>),
}

impl<R: rand::Rng> ReactionPolicy for Policy<R> {
    fn on_message(&mut self, line: &Line) -> Option<Line> {
        match self {
            Policy::Passive(p) => p.on_message(line),
            Policy::Echo(p) => p.on_message(line),
            Policy::Commands(p) => p.on_message(line),
        }
    }
}
