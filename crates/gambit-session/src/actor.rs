//! Session actor: an isolated Tokio task that owns one [`Session`].
//!
//! Every mutation (join, move, resign, clock tick) goes through the
//! actor's command channel or its ticker, and the actor handles them one
//! at a time. That single-writer loop is the per-session lock: unrelated
//! sessions run on their own tasks and never wait on each other.
//!
//! Readers don't queue behind writers. After each change the actor
//! publishes a fresh [`SessionView`] on a `watch` channel, and queries
//! read the latest one directly.

use std::sync::Arc;

use gambit_clock::{ClockTicker, TickConfig, TickInfo};
use gambit_protocol::{AccessToken, MoveResult, SessionId, Side};
use gambit_rules::Rules;
use tokio::sync::{mpsc, oneshot, watch};

use crate::{Session, SessionError, SessionView};

/// Commands sent to a session actor through its channel.
///
/// Each carries a `oneshot::Sender` reply channel: the caller sends the
/// command and waits for the answer on it.
pub(crate) enum SessionCommand {
    Join {
        identity: String,
        token: AccessToken,
        reply: oneshot::Sender<Result<Side, SessionError>>,
    },

    Move {
        token: AccessToken,
        notation: String,
        reply: oneshot::Sender<Result<MoveResult, SessionError>>,
    },

    Resign {
        token: AccessToken,
        reply: oneshot::Sender<Result<MoveResult, SessionError>>,
    },
}

/// Handle to a running session actor.
///
/// Cheap to clone: an `mpsc::Sender` plus a `watch::Receiver`. The
/// registry keeps one per session, and an automated-opponent driver holds
/// another.
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    sender: mpsc::Sender<SessionCommand>,
    view: watch::Receiver<Arc<SessionView>>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<SessionView> {
        self.view.borrow().clone()
    }

    /// A receiver that wakes on every published change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionView>> {
        self.view.clone()
    }

    pub async fn join(
        &self,
        identity: impl Into<String>,
        token: AccessToken,
    ) -> Result<Side, SessionError> {
        let identity = identity.into();
        self.request(|reply| SessionCommand::Join {
            identity,
            token,
            reply,
        })
        .await
    }

    pub async fn submit_move(
        &self,
        token: AccessToken,
        notation: impl Into<String>,
    ) -> Result<MoveResult, SessionError> {
        let notation = notation.into();
        self.request(|reply| SessionCommand::Move {
            token,
            notation,
            reply,
        })
        .await
    }

    pub async fn resign(
        &self,
        token: AccessToken,
    ) -> Result<MoveResult, SessionError> {
        self.request(|reply| SessionCommand::Resign { token, reply })
            .await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T, SessionError>>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| SessionError::Unavailable(self.id))?;
        reply_rx
            .await
            .map_err(|_| SessionError::Unavailable(self.id))?
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").field("id", &self.id).finish()
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct SessionActor<R: Rules> {
    session: Session<R>,
    ticker: ClockTicker,
    receiver: mpsc::Receiver<SessionCommand>,
    publisher: watch::Sender<Arc<SessionView>>,
}

impl<R: Rules> SessionActor<R> {
    /// Runs until every handle is dropped.
    ///
    /// Once the session is terminal the ticker is paused for good; the
    /// actor stays up only to answer late commands with the final result.
    async fn run(mut self) {
        let session_id = self.session.id();
        tracing::debug!(%session_id, "session actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                info = self.ticker.wait_for_tick() => self.on_tick(info),
            }
        }

        tracing::debug!(%session_id, "session actor stopped");
    }

    /// Applies `cmd`, publishes the new view, then replies, so a caller
    /// that gets an answer always sees at least that state in snapshots.
    fn handle(&mut self, cmd: SessionCommand) {
        let session_id = self.session.id();
        match cmd {
            SessionCommand::Join {
                identity,
                token,
                reply,
            } => {
                let result = self.session.join(identity.clone(), token);
                match &result {
                    Ok(side) => {
                        tracing::info!(%session_id, %identity, %side, "participant joined");
                    }
                    Err(reason) => {
                        tracing::debug!(%session_id, %identity, %reason, "join rejected");
                    }
                }
                self.publish();
                let _ = reply.send(result);
            }
            SessionCommand::Move {
                token,
                notation,
                reply,
            } => {
                let result = self.session.submit_move(&token, &notation);
                if let Err(reason) = &result {
                    tracing::debug!(%session_id, %notation, %reason, "move rejected");
                }
                self.publish();
                let _ = reply.send(result);
            }
            SessionCommand::Resign { token, reply } => {
                let result = self.session.resign(&token);
                self.publish();
                let _ = reply.send(result);
            }
        }
    }

    fn on_tick(&mut self, info: TickInfo) {
        if let Some(side) = self.session.tick() {
            tracing::info!(
                session_id = %self.session.id(),
                %side,
                tick = info.tick,
                late = info.overrun,
                "clock expired"
            );
            self.publish();
        }
    }

    fn publish(&mut self) {
        if self.session.phase().is_terminal() && !self.ticker.is_paused() {
            self.ticker.pause();
            let outcome = self.session.outcome();
            let metrics = self.ticker.metrics();
            tracing::info!(
                session_id = %self.session.id(),
                result = %outcome.result,
                method = %outcome.method,
                ticks = metrics.total_ticks,
                overruns = metrics.total_overruns,
                skipped = metrics.total_skipped,
                "session finished"
            );
        }
        let view = Arc::new(self.session.view());
        self.publisher.send_replace(view);
    }
}

/// Spawns a session actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it's full.
pub(crate) fn spawn_session<R: Rules>(
    session: Session<R>,
    tick: TickConfig,
    channel_size: usize,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let id = session.id();
    let (publisher, view) = watch::channel(Arc::new(session.view()));

    let actor = SessionActor {
        session,
        ticker: ClockTicker::new(tick),
        receiver: rx,
        publisher,
    };

    tokio::spawn(actor.run());

    SessionHandle {
        id,
        sender: tx,
        view,
    }
}
