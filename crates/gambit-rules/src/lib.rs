//! Rules-engine interface for Gambit.
//!
//! The session layer never looks inside a game position. Everything it
//! needs goes through the [`Rules`] trait: applying a move, reading the
//! result, whose turn it is, and printing the position.
//!
//! [`ChessRules`] (behind the default `chess` feature) implements standard
//! chess on top of the `chess` crate.

mod error;
mod logic;

#[cfg(feature = "chess")]
mod chess_rules;
#[cfg(feature = "chess")]
mod san;

pub use error::RulesError;
pub use logic::{Notation, Rules};

#[cfg(feature = "chess")]
pub use chess_rules::{ChessRules, ChessState};
