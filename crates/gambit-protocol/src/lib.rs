//! Shared vocabulary for Gambit.
//!
//! This crate defines the types every other layer agrees on:
//!
//! - **Identity** ([`SessionId`], [`AccessToken`], [`Side`]): who is
//!   playing, in which session, on which side of the board.
//! - **Outcomes** ([`GameResult`], [`Method`], [`Outcome`]): how a game
//!   ended (or that it hasn't yet).
//! - **Views** ([`MoveResult`], [`BoardView`], [`SessionSummary`], etc.):
//!   the JSON shapes returned to HTTP callers.
//!
//! # Architecture
//!
//! The protocol crate has no behavior of its own. The rules engine
//! produces [`Outcome`]s, the session layer produces views, and the HTTP
//! layer serializes them.
//!
//! ```text
//! Rules (Outcome) → Session (views) → HTTP (JSON)
//! ```

mod types;
mod views;

pub use types::{AccessToken, GameResult, Method, Outcome, SessionId, Side};
pub use views::{
    BoardView, CreateResponse, JoinResponse, LoginResponse, MoveResult,
    RemainingView, SessionStatus, SessionSummary, TurnView, format_clock,
};
