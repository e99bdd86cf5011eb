//! Local operator input and display.
//!
//! The engine only sees the `LineSource` and `LineSink` traits. `Console`
//! reads operator lines from stdin; `Terminal` shows chat lines on stdout and
//! notices on stderr.

use crate::protocol::{split_input, Line};
use std::collections::VecDeque;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tracing::warn;

/// Where outgoing lines come from during a write turn.
pub trait LineSource {
    /// Next operator line, or `None` once input is exhausted.
    async fn next_line(&mut self) -> Option<String>;
}

/// Where received lines and session notices go.
pub trait LineSink {
    /// Show a line under a role label, e.g. `Server> hello`.
    fn display(&mut self, label: &str, line: &Line);

    /// Show an informational notice outside the chat stream.
    fn notice(&mut self, text: &str);
}

/// Stdin-backed line source with a prompt.
pub struct Console {
    reader: BufReader<Stdin>,
    prompt: &'static str,
    pending: VecDeque<String>,
}

impl Console {
    /// `prompt` is printed (followed by a space) before each read.
    pub fn new(prompt: &'static str) -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            prompt,
            pending: VecDeque::new(),
        }
    }
}

impl LineSource for Console {
    async fn next_line(&mut self) -> Option<String> {
        if let Some(line) = self.pending.pop_front() {
            return Some(line);
        }

        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "{} ", self.prompt);
        let _ = stdout.flush();

        let mut raw = String::new();
        match self.reader.read_line(&mut raw).await {
            Ok(0) => None,
            Ok(_) => {
                self.pending.extend(split_input(&raw));
                self.pending.pop_front()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read local input");
                None
            }
        }
    }
}

/// Stdout/stderr-backed sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct Terminal;

impl LineSink for Terminal {
    fn display(&mut self, label: &str, line: &Line) {
        let text = line.text();
        let mut stdout = std::io::stdout();
        if text.ends_with('\n') {
            let _ = write!(stdout, "{label} {text}");
        } else {
            let _ = writeln!(stdout, "{label} {text}");
        }
        let _ = stdout.flush();
    }

    fn notice(&mut self, text: &str) {
        eprintln!("{text}");
    }
}
