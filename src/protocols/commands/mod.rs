//! Slash command policy.
//!
//! Lines starting with `/` are matched against a fixed command table:
//!
//! ```text
//! /time   -> 2026-01-31 09:15:00
//! /roll   -> You rolled: 4
//! /quote  -> one line from a fixed list
//! /other  -> Unknown command. Available: /time /roll /quote
//! hello   -> I got -> hello
//! ```
//!
//! Every reply is a single bounded line. Replies never end the turn.

pub mod handler;
pub mod parser;

pub use handler::CommandDispatch;
