//! Configuration module for duplex-chat.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Which end of the chat to run.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Listen for one client and auto-reply to its messages
    Server,
    /// Connect to a server and write first
    Client,
}

/// How the server answers ordinary messages.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Acknowledge every line with `I got -> <line>`
    Echo,
    /// Answer `/time`, `/roll` and `/quote`, acknowledge everything else
    #[default]
    Commands,
}

/// Command-line arguments for the chat
#[derive(Parser, Debug)]
#[command(name = "duplex-chat")]
#[command(author = "duplex-chat authors")]
#[command(version = "0.1.0")]
#[command(about = "A two-party half-duplex chat over TCP", long_about = None)]
pub struct CliArgs {
    /// Run as server (listener) or client (initiator)
    #[arg(value_enum)]
    pub mode: Mode,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to listen on (server) or connect to (client)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// TCP port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path of the append-only chat transcript
    #[arg(long)]
    pub chat_log: Option<PathBuf>,

    /// Do not write a chat transcript
    #[arg(long)]
    pub no_chat_log: bool,

    /// Server reply behavior
    #[arg(long, value_enum)]
    pub reply: Option<ReplyMode>,

    /// Seed for the server's dice and quotes (random if unset)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub chat_log: ChatLogConfig,
    #[serde(default)]
    pub responder: ResponderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection endpoint
#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Chat transcript
#[derive(Debug, Deserialize)]
pub struct ChatLogConfig {
    #[serde(default = "default_chat_log_path")]
    pub path: PathBuf,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ChatLogConfig {
    fn default() -> Self {
        Self {
            path: default_chat_log_path(),
            enabled: true,
        }
    }
}

/// Server-side reply behavior
#[derive(Debug, Deserialize, Default)]
pub struct ResponderConfig {
    #[serde(default)]
    pub reply: ReplyMode,
    pub seed: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_chat_log_path() -> PathBuf {
    PathBuf::from("chat_log.txt")
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub host: String,
    pub port: u16,
    /// `None` when the transcript is disabled.
    pub chat_log: Option<PathBuf>,
    pub reply: ReplyMode,
    pub seed: Option<u64>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        // Load TOML config if specified
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Ok(Self::merge(cli, toml_config))
    }

    fn merge(cli: CliArgs, toml_config: TomlConfig) -> Self {
        let chat_log = if cli.no_chat_log || !toml_config.chat_log.enabled {
            None
        } else {
            Some(cli.chat_log.unwrap_or(toml_config.chat_log.path))
        };

        Config {
            mode: cli.mode,
            host: cli.host.unwrap_or(toml_config.session.host),
            port: cli.port.unwrap_or(toml_config.session.port),
            chat_log,
            reply: cli.reply.unwrap_or(toml_config.responder.reply),
            seed: cli.seed.or(toml_config.responder.seed),
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        }
    }

    /// `host:port` for resolution.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["duplex-chat"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.session.host, "127.0.0.1");
        assert_eq!(config.session.port, 5000);
        assert_eq!(config.chat_log.path, PathBuf::from("chat_log.txt"));
        assert!(config.chat_log.enabled);
        assert_eq!(config.responder.reply, ReplyMode::Commands);
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [session]
            host = "chat.example.net"
            port = 6000

            [chat_log]
            path = "/tmp/chat.txt"

            [responder]
            reply = "echo"
            seed = 42

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.host, "chat.example.net");
        assert_eq!(config.session.port, 6000);
        assert_eq!(config.chat_log.path, PathBuf::from("/tmp/chat.txt"));
        assert!(config.chat_log.enabled);
        assert_eq!(config.responder.reply, ReplyMode::Echo);
        assert_eq!(config.responder.seed, Some(42));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_defaults() {
        let config = Config::from_args(args(&["server"])).unwrap();
        assert_eq!(config.mode, Mode::Server);
        assert_eq!(config.address(), "127.0.0.1:5000");
        assert_eq!(config.chat_log, Some(PathBuf::from("chat_log.txt")));
        assert_eq!(config.reply, ReplyMode::Commands);
        assert_eq!(config.seed, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[session]\nhost = \"10.0.0.1\"\nport = 7000\n[responder]\nreply = \"echo\""
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = Config::from_args(args(&[
            "client", "-c", &path, "-p", "7100", "--reply", "commands", "--no-chat-log",
        ]))
        .unwrap();

        assert_eq!(config.mode, Mode::Client);
        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.port, 7100);
        assert_eq!(config.reply, ReplyMode::Commands);
        assert_eq!(config.chat_log, None);
    }

    #[test]
    fn test_missing_config_file() {
        let err = Config::from_args(args(&["server", "-c", "/nonexistent/chat.toml"])).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(..)));
    }

    #[test]
    fn test_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\nport = \"not a number\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let err = Config::from_args(args(&["server", "-c", &path])).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(..)));
    }
}
