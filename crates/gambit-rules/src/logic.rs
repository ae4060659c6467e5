//! The `Rules` trait, the seam between sessions and game rules.

use gambit_protocol::{Outcome, Side};

use crate::RulesError;

/// Printable forms of a position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Notation {
    pub fen: String,
    pub pgn: String,
}

/// A rules engine.
///
/// States are immutable values: every operation that changes the game
/// returns a new state and leaves its input untouched, so a rejected move
/// can never leave a session half-updated.
///
/// Like the rest of the session layer, implementations are stateless:
/// all methods are associated functions and the engine is chosen by type
/// parameter (`Session<ChessRules>`).
pub trait Rules: Send + Sync + 'static {
    /// A game position plus whatever history the rules need.
    type State: Clone + Send + Sync + 'static;

    /// The starting position.
    fn new_game() -> Self::State;

    /// Applies `notation` for the side to move.
    fn apply_move(
        state: &Self::State,
        notation: &str,
    ) -> Result<Self::State, RulesError>;

    /// The result so far ([`Outcome::ONGOING`] while play continues).
    fn outcome(state: &Self::State) -> Outcome;

    /// The side to move.
    fn turn(state: &Self::State) -> Side;

    /// FEN and PGN for the position.
    fn serialize(state: &Self::State) -> Notation;

    /// Ends the game with `side` resigning. No-op if already decided.
    fn resign(state: &Self::State, side: Side) -> Self::State;

    /// Ends the game with `side` losing on time. No-op if already decided.
    fn time_out(state: &Self::State, side: Side) -> Self::State;
}
