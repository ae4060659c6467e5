//! Response shapes returned to HTTP callers.
//!
//! These are read-only projections. None of them carries an
//! [`AccessToken`](crate::AccessToken): tokens go in, identities come out.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GameResult, Method, SessionId, Side};

/// Result of an accepted move or a resignation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub outcome: GameResult,
    pub method: Method,
    pub fen: String,
}

/// Whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnView {
    pub turn: Side,
}

/// Full position of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub fen: String,
    pub pgn: String,
    pub outcome: GameResult,
    pub method: Method,
}

/// Remaining time from the caller's perspective.
///
/// `player`/`opponent` are `MM:SS` strings for display; the `_ms`
/// fields carry the exact values for clients that run their own countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingView {
    pub side: Side,
    pub player: String,
    pub opponent: String,
    pub player_ms: u64,
    pub opponent_ms: u64,
}

impl RemainingView {
    pub fn new(side: Side, player: Duration, opponent: Duration) -> Self {
        Self {
            side,
            player: format_clock(player),
            opponent: format_clock(opponent),
            player_ms: saturating_millis(player),
            opponent_ms: saturating_millis(opponent),
        }
    }
}

/// Coarse lifecycle status shown in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// A seat is still free.
    Open,
    /// Both seats are taken and no result is decided.
    Playing,
    /// A result is decided.
    Finished,
}

/// One row of the session listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub name: String,
    pub white: Option<String>,
    pub black: Option<String>,
    /// Set when one seat belongs to the automated opponent.
    pub automated: Option<Side>,
    pub status: SessionStatus,
    pub outcome: GameResult,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResponse {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    pub side: Side,
    pub session: SessionSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Formats a remaining duration as `MM:SS`, rounding down.
///
/// Minutes are not wrapped at 60, so a 90-minute allotment reads `90:00`.
pub fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
