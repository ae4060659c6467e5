//! Standard chess on top of the `chess` crate.

use std::fmt;

use chess::{BitBoard, Board, BoardStatus, Color, EMPTY, Piece};
use gambit_protocol::{Outcome, Method, Side};

use crate::{Notation, Rules, RulesError, san};

/// Positions repeated this many times end the game automatically.
const REPETITION_LIMIT: usize = 5;

/// Half-moves without a capture or pawn move that end the game automatically.
const HALFMOVE_LIMIT: u32 = 150;

/// A chess game: the current board plus the history the draw rules and
/// the PGN need.
#[derive(Clone)]
pub struct ChessState {
    board: Board,
    /// Moves so far, in SAN.
    moves: Vec<String>,
    halfmove_clock: u32,
    fullmove_number: u32,
    /// Position hashes since the last irreversible move (inclusive of the
    /// current one).
    positions: Vec<u64>,
    /// Set by resignation or timeout; overrides the board.
    forced: Option<Outcome>,
}

impl ChessState {
    fn from_board(board: Board) -> Self {
        Self {
            board,
            moves: Vec::new(),
            halfmove_clock: 0,
            fullmove_number: 1,
            positions: vec![board.get_hash()],
            forced: None,
        }
    }

    /// The underlying board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Moves played so far, in SAN.
    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    fn fen(&self) -> String {
        // The board's own FEN always prints "0 1" for the counters; it
        // doesn't track them.
        let raw = self.board.to_string();
        let fields: Vec<&str> = raw.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            fields.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    fn pgn(&self) -> String {
        let mut out = String::new();
        for (i, pair) in self.moves.chunks(2).enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&format!("{}. {}", i + 1, pair[0]));
            if let Some(reply) = pair.get(1) {
                out.push(' ');
                out.push_str(reply);
            }
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(ChessRules::outcome(self).result.as_pgn());
        out
    }

    fn board_outcome(&self) -> Outcome {
        match self.board.status() {
            BoardStatus::Checkmate => {
                Outcome::loss_for(side_of(self.board.side_to_move()), Method::Checkmate)
            }
            BoardStatus::Stalemate => Outcome::draw(Method::Stalemate),
            BoardStatus::Ongoing => {
                if insufficient_material(&self.board) {
                    Outcome::draw(Method::InsufficientMaterial)
                } else if self.repetitions() >= REPETITION_LIMIT {
                    Outcome::draw(Method::FivefoldRepetition)
                } else if self.halfmove_clock >= HALFMOVE_LIMIT {
                    Outcome::draw(Method::SeventyFiveMoveRule)
                } else {
                    Outcome::ONGOING
                }
            }
        }
    }

    fn repetitions(&self) -> usize {
        let current = self.board.get_hash();
        self.positions.iter().filter(|h| **h == current).count()
    }

    fn with_forced(&self, outcome: Outcome) -> Self {
        let mut next = self.clone();
        next.forced = Some(outcome);
        next
    }
}

impl fmt::Debug for ChessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChessState")
            .field("fen", &self.fen())
            .field("moves", &self.moves.len())
            .field("forced", &self.forced)
            .finish()
    }
}

/// Standard chess rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessRules;

impl Rules for ChessRules {
    type State = ChessState;

    fn new_game() -> ChessState {
        ChessState::from_board(Board::default())
    }

    fn apply_move(state: &ChessState, notation: &str) -> Result<ChessState, RulesError> {
        if Self::outcome(state).is_decided() {
            return Err(RulesError::GameOver);
        }

        let board = &state.board;
        let mv = san::parse(board, notation)
            .ok_or_else(|| RulesError::IllegalMove(notation.to_string()))?;

        // En passant is a pawn move, so the pawn check covers it.
        let irreversible = board.piece_on(mv.get_source()) == Some(Piece::Pawn)
            || board.piece_on(mv.get_dest()).is_some();

        let mut next = state.clone();
        next.moves.push(san::to_san(board, mv));
        next.board = board.make_move_new(mv);
        if board.side_to_move() == Color::Black {
            next.fullmove_number += 1;
        }
        if irreversible {
            next.halfmove_clock = 0;
            next.positions.clear();
        } else {
            next.halfmove_clock += 1;
        }
        next.positions.push(next.board.get_hash());
        Ok(next)
    }

    fn outcome(state: &ChessState) -> Outcome {
        state.forced.unwrap_or_else(|| state.board_outcome())
    }

    fn turn(state: &ChessState) -> Side {
        side_of(state.board.side_to_move())
    }

    fn serialize(state: &ChessState) -> Notation {
        Notation {
            fen: state.fen(),
            pgn: state.pgn(),
        }
    }

    fn resign(state: &ChessState, side: Side) -> ChessState {
        if Self::outcome(state).is_decided() {
            return state.clone();
        }
        state.with_forced(Outcome::loss_for(side, Method::Resignation))
    }

    fn time_out(state: &ChessState, side: Side) -> ChessState {
        if Self::outcome(state).is_decided() {
            return state.clone();
        }
        state.with_forced(Outcome::loss_for(side, Method::Timeout))
    }
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

/// Bare kings, or a king and one minor piece against a bare king.
fn insufficient_material(board: &Board) -> bool {
    let others: BitBoard = *board.combined() & !*board.pieces(Piece::King);
    match others.popcnt() {
        0 => true,
        1 => {
            let minors = *board.pieces(Piece::Knight) | *board.pieces(Piece::Bishop);
            others & minors != EMPTY
        }
        _ => false,
    }
}
