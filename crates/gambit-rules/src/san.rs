//! Standard Algebraic Notation.
//!
//! Parsing works backwards: every legal move is rendered to SAN and
//! compared against the (normalized) input. Positions have at most a few
//! dozen legal moves, and this guarantees that whatever we accept, we also
//! print the same way in the PGN.

use chess::{Board, BoardStatus, ChessMove, MoveGen, Piece};

/// Renders `mv` in SAN for `board`. `mv` must be legal.
pub(crate) fn to_san(board: &Board, mv: ChessMove) -> String {
    let mut san = body(board, mv);
    let next = board.make_move_new(mv);
    if next.status() == BoardStatus::Checkmate {
        san.push('#');
    } else if next.checkers().popcnt() > 0 {
        san.push('+');
    }
    san
}

/// Finds the legal move `text` refers to, in SAN or UCI coordinates.
pub(crate) fn parse(board: &Board, text: &str) -> Option<ChessMove> {
    let wanted = normalize(text);
    if wanted.is_empty() {
        return None;
    }
    MoveGen::new_legal(board).find(|mv| {
        body(board, *mv) == wanted || mv.to_string() == wanted.to_ascii_lowercase()
    })
}

/// Strips check/mate marks and annotation glyphs, and accepts zeros for
/// castling.
fn normalize(text: &str) -> String {
    let trimmed = text
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    match trimmed {
        "0-0" => "O-O".to_string(),
        "0-0-0" => "O-O-O".to_string(),
        other => other.to_string(),
    }
}

/// SAN without the check suffix.
fn body(board: &Board, mv: ChessMove) -> String {
    let src = mv.get_source();
    let dest = mv.get_dest();
    let Some(piece) = board.piece_on(src) else {
        return mv.to_string();
    };

    let file_delta = dest.get_file().to_index() as i32 - src.get_file().to_index() as i32;
    if piece == Piece::King && file_delta.abs() == 2 {
        return if file_delta > 0 { "O-O" } else { "O-O-O" }.to_string();
    }

    let capture = board.piece_on(dest).is_some() || (piece == Piece::Pawn && file_delta != 0);
    let mut san = String::with_capacity(7);

    if piece == Piece::Pawn {
        if capture {
            san.push(file_char(src.get_file().to_index()));
            san.push('x');
        }
        san.push_str(&dest.to_string());
        if let Some(promo) = mv.get_promotion() {
            san.push('=');
            san.push(piece_char(promo));
        }
        return san;
    }

    san.push(piece_char(piece));

    // Disambiguate against other pieces of the same kind that can reach
    // the same square: file first, then rank, then both.
    let rivals: Vec<ChessMove> = MoveGen::new_legal(board)
        .filter(|other| {
            other.get_dest() == dest
                && other.get_source() != src
                && board.piece_on(other.get_source()) == Some(piece)
        })
        .collect();
    if !rivals.is_empty() {
        let same_file = rivals
            .iter()
            .any(|r| r.get_source().get_file() == src.get_file());
        let same_rank = rivals
            .iter()
            .any(|r| r.get_source().get_rank() == src.get_rank());
        if !same_file {
            san.push(file_char(src.get_file().to_index()));
        } else if !same_rank {
            san.push(rank_char(src.get_rank().to_index()));
        } else {
            san.push(file_char(src.get_file().to_index()));
            san.push(rank_char(src.get_rank().to_index()));
        }
    }

    if capture {
        san.push('x');
    }
    san.push_str(&dest.to_string());
    san
}

fn piece_char(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

fn file_char(index: usize) -> char {
    (b'a' + index as u8) as char
}

fn rank_char(index: usize) -> char {
    (b'1' + index as u8) as char
}
