//! Half-duplex turn engine.
//!
//! One engine runs each side of a session. It alternates between two
//! macro-states:
//!
//! ```text
//!            x\n sent                    x\n received
//!   Write ───────────────▶ Read ─────────────────────▶ Write ...
//!     │                     │
//!     │ xx\n sent           │ xx\n received / peer closed / fault
//!     ▼                     ▼
//!   done                  done
//! ```
//!
//! The Initiator starts in `Write`, the Responder in `Read`. After that only
//! the sentinels move the engine; the role matters again only for labels and
//! for fault reporting.

use crate::chat_log::Logger;
use crate::connection::{Connection, Received};
use crate::console::{LineSink, LineSource};
use crate::protocol::{Line, LineKind, Role, Turn};
use crate::protocols::ReactionPolicy;
use std::fmt;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// This side sent the terminator.
    Local,
    /// The peer sent the terminator.
    Peer,
    /// The peer closed the connection.
    PeerClosed,
    /// A send or receive failed.
    Fault(Fault),
}

/// A connection-level I/O failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// The operation that failed, e.g. `recv()`.
    pub operation: &'static str,
    pub kind: io::ErrorKind,
    pub message: String,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.message)
    }
}

/// Result of one macro-state.
enum Step {
    Switch(Turn),
    Done(TerminationReason),
}

/// The turn-taking state machine for one session.
pub struct TurnEngine<S, I, O, L, P> {
    conn: Connection<S>,
    role: Role,
    source: I,
    sink: O,
    logger: L,
    policy: P,
}

impl<S, I, O, L, P> TurnEngine<S, I, O, L, P>
where
    S: AsyncRead + AsyncWrite + Unpin,
    I: LineSource,
    O: LineSink,
    L: Logger,
    P: ReactionPolicy,
{
    pub fn new(conn: Connection<S>, role: Role, source: I, sink: O, logger: L, policy: P) -> Self {
        Self {
            conn,
            role,
            source,
            sink,
            logger,
            policy,
        }
    }

    /// Run until a terminator, a peer close, or a fault. The connection is
    /// closed on return.
    pub async fn run(mut self) -> TerminationReason {
        let mut turn = self.role.first_turn();
        debug!(role = ?self.role, ?turn, "Session started");

        let reason = loop {
            let step = match turn {
                Turn::Write => self.write_turn().await,
                Turn::Read => self.read_turn().await,
            };
            match step {
                Step::Switch(next) => {
                    debug!(from = ?turn, to = ?next, "Turn switched");
                    turn = next;
                }
                Step::Done(reason) => break reason,
            }
        };

        self.conn.close().await;
        info!(role = ?self.role, ?reason, "Session ended");
        reason
    }

    async fn write_turn(&mut self) -> Step {
        loop {
            let line = Line::from_input(self.source.next_line().await);

            if let Err(e) = self.conn.send(&line).await {
                return Step::Done(self.fault("send()", e).await);
            }
            self.logger.append(self.role.local_label(), line.as_bytes());

            match line.kind() {
                LineKind::Terminate => {
                    self.sink.notice("You typed 'xx'. Closing connection.");
                    return Step::Done(TerminationReason::Local);
                }
                LineKind::Yield => {
                    if self.role == Role::Initiator {
                        self.sink.notice("Waiting for server response...");
                    }
                    return Step::Switch(Turn::Read);
                }
                LineKind::Message => {}
            }
        }
    }

    async fn read_turn(&mut self) -> Step {
        loop {
            let line = match self.conn.receive().await {
                Ok(Received::Line(line)) => line,
                Ok(Received::Closed) => {
                    let notice = format!("{} disconnected.", self.role.peer_name());
                    info!("{notice}");
                    self.sink.notice(&notice);
                    return Step::Done(TerminationReason::PeerClosed);
                }
                Err(e) => return Step::Done(self.fault("recv()", e).await),
            };

            self.sink.display(self.role.peer_label(), &line);
            self.logger.append(self.role.peer_label(), line.as_bytes());

            match line.kind() {
                LineKind::Terminate => {
                    self.sink.notice(&format!(
                        "{} sent 'xx'. Closing connection.",
                        self.role.peer_name()
                    ));
                    return Step::Done(TerminationReason::Peer);
                }
                LineKind::Yield => return Step::Switch(Turn::Write),
                LineKind::Message => {}
            }

            if let Some(reply) = self.policy.on_message(&line) {
                if let Err(e) = self.conn.send(&reply).await {
                    return Step::Done(self.fault("auto-reply send()", e).await);
                }
                self.logger.append(self.role.reply_label(), reply.as_bytes());
            }
        }
    }

    /// Report a connection fault locally and, on the Responder, to the peer.
    async fn fault(&mut self, operation: &'static str, err: io::Error) -> TerminationReason {
        let fault = Fault {
            operation,
            kind: err.kind(),
            message: err.to_string(),
        };
        warn!(role = ?self.role, operation, error = %err, "Connection fault");

        let report = match self.role {
            Role::Responder => format!("SERVER ERROR in {fault}"),
            Role::Initiator => format!("CLIENT ERROR in {fault}"),
        };
        self.sink.notice(&report);
        self.logger.append("Error:", report.as_bytes());

        if self.role == Role::Responder {
            // Best effort: the connection may already be unusable.
            if let Err(e) = self.conn.send(&Line::bounded(&report)).await {
                debug!(error = %e, "Could not report fault to peer");
            }
        }

        TerminationReason::Fault(fault)
    }
}
