//! Error types for the session layer.

use gambit_protocol::{MoveResult, SessionId, Side};
use gambit_rules::RulesError;

/// Errors returned by session operations.
///
/// All of these are answers to the caller, never process-fatal. A
/// rejected operation leaves the session exactly as it was, with one
/// exception: [`ClockExpired`](Self::ClockExpired) records the timeout it
/// reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The token doesn't occupy a seat in this session.
    #[error("token does not belong to a participant")]
    Unauthorized,

    /// The session does not exist.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The token already holds a seat here.
    #[error("already joined as {0}")]
    AlreadyJoined(Side),

    /// Both seats are taken.
    #[error("session {0} is full")]
    Full(SessionId),

    /// The session ended before it could be joined.
    #[error("session {0} has finished")]
    Finished(SessionId),

    /// The mover's side is not the active side.
    #[error("not {0}'s turn")]
    NotYourTurn(Side),

    /// The mover's clock had already run out. The session is now terminal
    /// and `result` describes it.
    #[error("{side}'s clock has run out")]
    ClockExpired { side: Side, result: MoveResult },

    /// The rules engine refused the move.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// The session already has a result.
    #[error("game is already over")]
    GameOver,

    /// Malformed request data (empty name, empty move, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An automated opponent was requested but none is configured.
    #[error("automated opponent is not available")]
    OpponentUnavailable,

    /// The session actor has stopped or its channel is closed.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),

    /// A session with this ID is already registered.
    #[error("session {0} already registered")]
    Duplicate(SessionId),
}

/// The caller-facing category of a [`SessionError`].
///
/// Engine failures have no kind here: they stay inside the driver as
/// [`EngineError`](gambit_engine::EngineError) and never reach a caller of
/// a session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    Conflict,
    BadRequest,
    Internal,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyJoined(_) | Self::Full(_) | Self::Finished(_) => {
                ErrorKind::Conflict
            }
            Self::NotYourTurn(_)
            | Self::ClockExpired { .. }
            | Self::IllegalMove(_)
            | Self::GameOver
            | Self::InvalidInput(_)
            | Self::OpponentUnavailable => ErrorKind::BadRequest,
            Self::Unavailable(_) | Self::Duplicate(_) => ErrorKind::Internal,
        }
    }
}

impl From<RulesError> for SessionError {
    fn from(err: RulesError) -> Self {
        match err {
            RulesError::IllegalMove(notation) => Self::IllegalMove(notation),
            RulesError::GameOver => Self::GameOver,
        }
    }
}
