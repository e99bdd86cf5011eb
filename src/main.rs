//! duplex-chat: a two-party half-duplex chat over one TCP connection
//!
//! One side listens (server), the other connects (client). Only one side
//! holds the write turn at a time:
//! - `x` on a line by itself hands the turn to the peer
//! - `xx` on a line by itself ends the session for both sides
//!
//! Features:
//! - Server auto-replies to every message, with `/time`, `/roll` and `/quote`
//! - Timestamped append-only chat transcript
//! - Configuration via CLI arguments or TOML file

mod chat_log;
mod config;
mod connection;
mod console;
mod engine;
mod protocol;
mod protocols;
mod server;

use config::Config;
use engine::TerminationReason;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!(
        mode = ?config.mode,
        host = %config.host,
        port = config.port,
        reply = ?config.reply,
        chat_log = ?config.chat_log,
        "Starting duplex-chat"
    );

    // One session, one thread of control
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let reason = runtime.block_on(server::run(config))?;

    match reason {
        TerminationReason::Fault(fault) => {
            error!(%fault, kind = ?fault.kind, "Session ended with a connection fault");
            std::process::exit(1);
        }
        reason => {
            info!(?reason, "Session closed");
            Ok(())
        }
    }
}
