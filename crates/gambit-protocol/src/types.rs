//! Identity and outcome types shared by every Gambit layer.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a game session.
///
/// Newtype over a UUIDv7. Version 7 UUIDs embed a millisecond timestamp,
/// so identifiers allocated later also sort later, and two processes
/// never hand out the same one without coordination.
///
/// `#[serde(transparent)]` serializes this as the bare UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Allocates a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// The secret a participant presents to act in a session.
///
/// Tokens are compared, never displayed: the `Debug` impl only shows a
/// short prefix so a token that ends up in a log line can't be replayed.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// A fresh random token: 32 hex characters (128 bits of entropy).
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::rng().random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "AccessToken({prefix}…)")
    }
}

impl From<&str> for AccessToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccessToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the two roles in a session.
///
/// `White` moves first. On the wire a side is a single letter (`"w"` or
/// `"b"`), matching the side-to-move field of a FEN string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Side {
    /// Both sides, in slot order.
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    /// The side that moves first.
    pub const FIRST: Side = Side::White;

    /// The opposing side.
    pub fn other(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Slot index: 0 for White, 1 for Black.
    pub fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }

    /// The single-letter wire form.
    pub fn letter(self) -> &'static str {
        match self {
            Self::White => "w",
            Self::Black => "b",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The scoreboard result of a game, in PGN notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "*")]
    Ongoing,
    #[serde(rename = "1-0")]
    WhiteWon,
    #[serde(rename = "0-1")]
    BlackWon,
    #[serde(rename = "1/2-1/2")]
    Draw,
}

impl GameResult {
    /// The result in which `side` wins.
    pub fn win_for(side: Side) -> Self {
        match side {
            Side::White => Self::WhiteWon,
            Side::Black => Self::BlackWon,
        }
    }

    /// The PGN result token.
    pub fn as_pgn(self) -> &'static str {
        match self {
            Self::Ongoing => "*",
            Self::WhiteWon => "1-0",
            Self::BlackWon => "0-1",
            Self::Draw => "1/2-1/2",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_pgn())
    }
}

/// How a game reached its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    NoMethod,
    Checkmate,
    Resignation,
    Timeout,
    Stalemate,
    InsufficientMaterial,
    FivefoldRepetition,
    SeventyFiveMoveRule,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoMethod => "NoMethod",
            Self::Checkmate => "Checkmate",
            Self::Resignation => "Resignation",
            Self::Timeout => "Timeout",
            Self::Stalemate => "Stalemate",
            Self::InsufficientMaterial => "InsufficientMaterial",
            Self::FivefoldRepetition => "FivefoldRepetition",
            Self::SeventyFiveMoveRule => "SeventyFiveMoveRule",
        };
        f.write_str(s)
    }
}

/// A result paired with the method that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    pub result: GameResult,
    pub method: Method,
}

impl Outcome {
    /// No result yet.
    pub const ONGOING: Outcome = Outcome {
        result: GameResult::Ongoing,
        method: Method::NoMethod,
    };

    pub fn new(result: GameResult, method: Method) -> Self {
        Self { result, method }
    }

    /// `side` lost by `method` (resignation, timeout, checkmate).
    pub fn loss_for(side: Side, method: Method) -> Self {
        Self::new(GameResult::win_for(side.other()), method)
    }

    pub fn draw(method: Method) -> Self {
        Self::new(GameResult::Draw, method)
    }

    /// Returns `true` once a result has been decided.
    pub fn is_decided(&self) -> bool {
        self.result != GameResult::Ongoing
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self::ONGOING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_serializes_as_fen_letter() {
        assert_eq!(serde_json::to_string(&Side::White).unwrap(), "\"w\"");
        assert_eq!(serde_json::to_string(&Side::Black).unwrap(), "\"b\"");
        let side: Side = serde_json::from_str("\"b\"").unwrap();
        assert_eq!(side, Side::Black);
    }

    #[test]
    fn test_generate_token_is_hex_and_not_repeated() {
        let a = AccessToken::generate();
        let b = AccessToken::generate();
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_side_other_is_an_involution() {
        for side in Side::ALL {
            assert_ne!(side.other(), side);
            assert_eq!(side.other().other(), side);
        }
    }

    #[test]
    fn test_game_result_serializes_as_pgn_token() {
        let json = serde_json::to_string(&GameResult::Draw).unwrap();
        assert_eq!(json, "\"1/2-1/2\"");
        assert_eq!(GameResult::Ongoing.to_string(), "*");
    }

    #[test]
    fn test_loss_for_credits_the_other_side() {
        let outcome = Outcome::loss_for(Side::White, Method::Timeout);
        assert_eq!(outcome.result, GameResult::BlackWon);
        assert_eq!(outcome.method, Method::Timeout);
        assert!(outcome.is_decided());
        assert!(!Outcome::ONGOING.is_decided());
    }

    #[test]
    fn test_session_id_round_trips_through_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_session_ids_allocated_later_sort_later() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert!(a < b);
    }

    #[test]
    fn test_access_token_debug_hides_the_secret() {
        let token = AccessToken::new("0123456789abcdef");
        let debug = format!("{token:?}");
        assert!(!debug.contains("456789"));
        assert!(debug.starts_with("AccessToken(0123"));
    }
}
