//! Command replies for the Responder.

use super::parser::{parse, Command, ParseResult, COMMANDS, COMMAND_PREFIX};
use crate::chat_log::TIMESTAMP_FORMAT;
use crate::protocol::Line;
use crate::protocols::echo::acknowledge;
use crate::protocols::ReactionPolicy;
use chrono::Local;
use rand::seq::SliceRandom;
use rand::Rng;

/// Quotations served by `/quote`.
pub const QUOTES: &[&str] = &[
    "Simplicity is prerequisite for reliability. - Edsger Dijkstra",
    "Talk is cheap. Show me the code. - Linus Torvalds",
    "Premature optimization is the root of all evil. - Donald Knuth",
    "There is no place like 127.0.0.1.",
    "Programs must be written for people to read. - Harold Abelson",
];

/// Answers slash commands and acknowledges everything else.
///
/// The random source is owned for the whole session and never reseeded.
pub struct CommandDispatch<R> {
    rng: R,
}

impl<R: Rng> CommandDispatch<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Reply for one received line.
    pub fn dispatch(&mut self, line: &Line) -> Line {
        let text = line.text();
        match parse(&text) {
            ParseResult::Command(cmd) => self.execute(cmd),
            ParseResult::Unknown => unknown_command(),
            ParseResult::NotCommand => acknowledge(line),
        }
    }

    fn execute(&mut self, cmd: Command) -> Line {
        match cmd {
            Command::Time => Line::bounded(&Local::now().format(TIMESTAMP_FORMAT).to_string()),
            Command::Roll => {
                let n: u8 = self.rng.gen_range(1..=6);
                Line::bounded(&format!("You rolled: {n}"))
            }
            Command::Quote => {
                let quote = QUOTES.choose(&mut self.rng).copied().unwrap_or_default();
                Line::bounded(quote)
            }
        }
    }
}

impl<R: Rng> ReactionPolicy for CommandDispatch<R> {
    fn on_message(&mut self, line: &Line) -> Option<Line> {
        Some(self.dispatch(line))
    }
}

/// Fixed reply for a prefixed line that names no command.
pub fn unknown_command() -> Line {
    let names: Vec<String> = COMMANDS
        .iter()
        .map(|(name, _)| format!("{COMMAND_PREFIX}{name}"))
        .collect();
    Line::bounded(&format!("Unknown command. Available: {}", names.join(" ")))
}
