//! Automated opponent: a background task that plays one seat.
//!
//! The driver is an ordinary participant. It holds a seat token and
//! submits moves through [`SessionHandle::submit_move`] like anyone else,
//! so the turn, clock, and legality checks apply to it unchanged.

use std::sync::Arc;
use std::time::Duration;

use gambit_engine::{EngineError, EngineLauncher, MoveEngine};
use gambit_protocol::{AccessToken, Side};
use tokio::time::{sleep, timeout};

use crate::{SessionError, SessionHandle};

/// Settings for automated opponents.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Search time requested from the engine for each move.
    ///
    /// Default: 1 second.
    pub move_budget: Duration,

    /// How long past the budget to wait for an answer before treating the
    /// engine as failed.
    pub response_grace: Duration,

    /// Upper bound on how long the driver sleeps between looks at the
    /// session. It also wakes on every published change, so this mostly
    /// matters if a change notification is missed.
    pub poll_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            move_budget: Duration::from_secs(1),
            response_grace: Duration::from_millis(500),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Why a driver stopped.
#[derive(Debug)]
pub enum DriverExit {
    /// The session reached a result.
    Finished,
    /// The engine failed to start or to produce a move.
    Engine(EngineError),
    /// The session refused a move the engine chose.
    Rejected(SessionError),
    /// The session actor went away.
    Detached,
}

/// Drives the automated seat `side` of `handle`'s session until it ends.
///
/// Spawned once per session, right after the seat is reserved. Never
/// restarted: an engine failure stops the driver and leaves the session
/// as it is, so the human can still win on time or resign.
pub async fn run_driver<L: EngineLauncher>(
    launcher: Arc<L>,
    handle: SessionHandle,
    side: Side,
    token: AccessToken,
    config: DriverConfig,
) -> DriverExit {
    let session_id = handle.id();
    let mut engine = match launcher.launch().await {
        Ok(engine) => engine,
        Err(err) => {
            tracing::warn!(%session_id, %side, error = %err, "engine failed to start, automated opponent disabled");
            return DriverExit::Engine(err);
        }
    };
    tracing::info!(%session_id, %side, "automated opponent started");

    let exit = play(&mut engine, &handle, side, &token, &config).await;

    match &exit {
        DriverExit::Finished => {
            tracing::info!(%session_id, %side, "automated opponent stopped, session finished");
        }
        DriverExit::Engine(err) => {
            tracing::warn!(%session_id, %side, error = %err, "engine failed, automated opponent stopped");
        }
        DriverExit::Rejected(err) => {
            tracing::warn!(%session_id, %side, error = %err, "engine move rejected, automated opponent stopped");
        }
        DriverExit::Detached => {
            tracing::warn!(%session_id, %side, "session went away, automated opponent stopped");
        }
    }

    engine.shutdown().await;
    exit
}

async fn play<E: MoveEngine>(
    engine: &mut E,
    handle: &SessionHandle,
    side: Side,
    token: &AccessToken,
    config: &DriverConfig,
) -> DriverExit {
    let mut changes = handle.subscribe();
    let deadline = config.move_budget + config.response_grace;

    loop {
        let view = changes.borrow_and_update().clone();
        if view.phase.is_terminal() {
            return DriverExit::Finished;
        }

        if view.turn == side {
            let chosen = timeout(
                deadline,
                engine.best_move(&view.board.fen, config.move_budget),
            )
            .await
            .map_err(|_| EngineError::Timeout(deadline))
            .and_then(|answer| answer);

            let mv = match chosen {
                Ok(mv) => mv,
                Err(err) => return DriverExit::Engine(err),
            };

            match handle.submit_move(token.clone(), mv).await {
                Ok(_) => continue,
                // The game ended or the turn changed while the engine was
                // thinking; the next look at the view sorts it out.
                Err(
                    SessionError::GameOver
                    | SessionError::ClockExpired { .. }
                    | SessionError::NotYourTurn(_),
                ) => continue,
                Err(SessionError::Unavailable(_)) => return DriverExit::Detached,
                Err(err) => return DriverExit::Rejected(err),
            }
        }

        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    return DriverExit::Detached;
                }
            }
            _ = sleep(config.poll_interval) => {}
        }
    }
}
