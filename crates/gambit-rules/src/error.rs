//! Error types for the rules layer.

/// Why the rules engine refused a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// The notation didn't parse, or parsed to a move that isn't legal
    /// in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// The game already has a result.
    #[error("game is already over")]
    GameOver,
}
