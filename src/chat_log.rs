//! Append-only chat transcript.
//!
//! Each entry is written as `[YYYY-MM-DD HH:MM:SS] <label> <line>`. The file
//! is opened in append mode per entry, and any failure to open or write it
//! is ignored: the transcript must never affect the session.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp format shared by the transcript and the `/time` command.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sink for (direction label, raw line) pairs.
pub trait Logger {
    fn append(&mut self, label: &str, raw: &[u8]);
}

/// File-backed transcript. A `ChatLog` without a path records nothing.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    path: Option<PathBuf>,
}

impl ChatLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    fn write_entry(path: &Path, label: &str, raw: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let stamp = Local::now().format(TIMESTAMP_FORMAT);

        let mut entry = format!("[{stamp}] {label} ").into_bytes();
        entry.extend_from_slice(raw);
        if raw.last() != Some(&b'\n') {
            entry.push(b'\n');
        }
        file.write_all(&entry)
    }
}

impl Logger for ChatLog {
    fn append(&mut self, label: &str, raw: &[u8]) {
        if let Some(path) = &self.path {
            let _ = Self::write_entry(path, label, raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_entries_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_log.txt");
        let mut log = ChatLog::new(path.clone());

        log.append("Client>", b"hello\n");
        log.append("Server auto-reply:", b"I got -> hello\n");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] Client> hello"));
        assert!(lines[1].ends_with("] Server auto-reply: I got -> hello"));
    }

    #[test]
    fn test_entry_timestamp_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_log.txt");
        let mut log = ChatLog::new(path.clone());

        log.append("Server>", b"bye\n");

        let contents = std::fs::read_to_string(&path).unwrap();
        let stamp = &contents[1..20];
        assert_eq!(&contents[20..22], "] ");
        assert!(NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_missing_newline_is_added() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_log.txt");
        let mut log = ChatLog::new(path.clone());

        log.append("Client>", b"partial");
        log.append("Client>", b"next\n");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.ends_with("Client> next\n"));
    }

    #[test]
    fn test_unwritable_path_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ChatLog::new(dir.path().join("missing").join("chat_log.txt"));
        log.append("Client>", b"hello\n");

        let mut off = ChatLog::disabled();
        off.append("Client>", b"hello\n");
    }
}
