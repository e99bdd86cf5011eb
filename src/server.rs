//! Session bootstrap.
//!
//! Resolves the configured address, establishes the one TCP connection a
//! session runs over, and hands it to a `TurnEngine` with the policy that
//! fits the role.

use crate::chat_log::ChatLog;
use crate::config::{Config, Mode, ReplyMode};
use crate::connection::Connection;
use crate::console::{Console, Terminal};
use crate::engine::{TerminationReason, TurnEngine};
use crate::protocol::Role;
use crate::protocols::{CommandDispatch, EchoOnly, Passive, Policy};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::net::SocketAddr;
use tokio::net::{lookup_host, TcpListener, TcpStream};
use tracing::{debug, info};

/// Pending connections allowed on the listener
const LISTENING_DEPTH: i32 = 2;

/// Host name buffer size
const NAMESIZE: usize = 255;

/// Run one chat session as configured.
pub async fn run(config: Config) -> Result<TerminationReason, Box<dyn std::error::Error>> {
    let node = local_hostname()?;
    let addr = resolve(&config.address()).await?;
    let chat_log = match &config.chat_log {
        Some(path) => ChatLog::new(path.clone()),
        None => ChatLog::disabled(),
    };

    let reason = match config.mode {
        Mode::Server => {
            let listener = bind(addr)?;
            eprintln!(
                "server running on node {node}, listening on {}",
                listener.local_addr()?
            );
            let stream = accept_one(&listener).await?;
            let policy = responder_policy(config.reply, config.seed);
            session(stream, Role::Responder, chat_log, policy).await
        }
        Mode::Client => {
            eprintln!("client running on node {node}");
            eprintln!("client about to connect to server at {addr}");
            let stream = TcpStream::connect(addr).await?;
            info!(peer = %addr, "Connected");
            session(stream, Role::Initiator, chat_log, Policy::Passive(Passive)).await
        }
    };

    Ok(reason)
}

/// Drive one engine over an established stream with the terminal attached.
pub async fn session(
    stream: TcpStream,
    role: Role,
    chat_log: ChatLog,
    policy: Policy<StdRng>,
) -> TerminationReason {
    let console = Console::new(role.local_label());
    TurnEngine::new(Connection::new(stream), role, console, Terminal, chat_log, policy)
        .run()
        .await
}

/// Build the Responder's policy. The RNG is seeded here, once per session.
pub fn responder_policy(reply: ReplyMode, seed: Option<u64>) -> Policy<StdRng> {
    match reply {
        ReplyMode::Echo => Policy::Echo(EchoOnly),
        ReplyMode::Commands => {
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            Policy::Commands(CommandDispatch::new(rng))
        }
    }
}

/// Name of this machine, as reported by `gethostname(2)`.
pub fn local_hostname() -> io::Result<String> {
    let mut buf = [0u8; NAMESIZE];
    // SAFETY: `buf` is valid for writes of `buf.len()` bytes.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

/// Resolve `host:port` to the first usable address.
pub async fn resolve(address: &str) -> io::Result<SocketAddr> {
    let addr = lookup_host(address).await?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no address found for {address}"),
        )
    })?;
    debug!(%address, resolved = %addr, "Resolved address");
    Ok(addr)
}

/// Create the listening socket.
pub fn bind(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTENING_DEPTH)?;

    let listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(listener)
}

/// Accept exactly one client. The listener is not used again.
pub async fn accept_one(listener: &TcpListener) -> io::Result<TcpStream> {
    let (stream, peer) = listener.accept().await?;
    info!(%peer, "Client connected");
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{LineSink, LineSource};
    use crate::protocol::Line;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct Script(VecDeque<&'static str>);

    impl LineSource for Script {
        async fn next_line(&mut self) -> Option<String> {
            self.0.pop_front().map(str::to_string)
        }
    }

    #[derive(Clone, Default)]
    struct Screen(Arc<Mutex<Vec<String>>>);

    impl LineSink for Screen {
        fn display(&mut self, label: &str, line: &Line) {
            self.0.lock().unwrap().push(format!("{label} {}", line.text()));
        }

        fn notice(&mut self, _text: &str) {}
    }

    #[test]
    fn test_local_hostname() {
        let node = local_hostname().unwrap();
        assert!(!node.is_empty());
        assert!(!node.contains('\0'));
    }

    #[tokio::test]
    async fn test_resolve_loopback() {
        let addr = resolve("127.0.0.1:5000").await.unwrap();
        assert_eq!(addr.port(), 5000);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_responder_policy_selection() {
        assert!(matches!(
            responder_policy(ReplyMode::Echo, None),
            Policy::Echo(_)
        ));
        assert!(matches!(
            responder_policy(ReplyMode::Commands, Some(3)),
            Policy::Commands(_)
        ));
    }

    #[tokio::test]
    async fn test_loopback_conversation() {
        let listener = bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let server_screen = Screen::default();
        let server_view = server_screen.clone();
        let server = async move {
            let stream = accept_one(&listener).await.unwrap();
            TurnEngine::new(
                Connection::new(stream),
                Role::Responder,
                Script(VecDeque::from(["bye\n", "xx\n"])),
                server_screen,
                ChatLog::disabled(),
                responder_policy(ReplyMode::Echo, None),
            )
            .run()
            .await
        };

        let client_screen = Screen::default();
        let client_view = client_screen.clone();
        let client = async move {
            let stream = TcpStream::connect(addr).await.unwrap();
            TurnEngine::new(
                Connection::new(stream),
                Role::Initiator,
                Script(VecDeque::from(["hello\n", "x\n", "never sent\n"])),
                client_screen,
                ChatLog::disabled(),
                Passive,
            )
            .run()
            .await
        };

        let (server, client) = tokio::join!(server, client);

        assert_eq!(client, TerminationReason::Peer);
        assert_eq!(server, TerminationReason::Local);

        assert_eq!(
            *client_view.0.lock().unwrap(),
            vec!["Server> I got -> hello\n", "Server> bye\n", "Server> xx\n"]
        );
        assert_eq!(
            *server_view.0.lock().unwrap(),
            vec!["Client> hello\n", "Client> x\n"]
        );
    }
}
