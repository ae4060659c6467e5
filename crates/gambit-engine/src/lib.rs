//! Automated-opponent engine abstraction for Gambit.
//!
//! Provides the [`EngineLauncher`] and [`MoveEngine`] traits that abstract
//! over whatever produces the automated side's moves. The session layer
//! only ever asks one question: "given this position and this much time,
//! what do you play?"
//!
//! # Feature Flags
//!
//! - `uci` (default): an external engine process speaking the Universal
//!   Chess Interface over stdin/stdout ([`UciLauncher`], [`UciEngine`])

mod error;
#[cfg(feature = "uci")]
mod uci;

pub use error::EngineError;
#[cfg(feature = "uci")]
pub use uci::{UciConfig, UciEngine, UciLauncher, parse_bestmove};

use std::future::Future;
use std::time::Duration;

/// Starts engines. One engine instance per automated opponent.
///
/// The launcher is shared across sessions (`Send + Sync`); the engines it
/// produces are owned by a single driver task each.
pub trait EngineLauncher: Send + Sync + 'static {
    /// The engine type produced by this launcher.
    type Engine: MoveEngine;

    /// Starts a fresh engine, ready to search.
    fn launch(
        &self,
    ) -> impl Future<Output = Result<Self::Engine, EngineError>> + Send;
}

/// A running move-selection engine.
pub trait MoveEngine: Send + 'static {
    /// Searches `fen` for about `budget` and returns a move in UCI
    /// coordinate notation (`e2e4`, `e7e8q`).
    ///
    /// Implementations must give up and return [`EngineError::Timeout`]
    /// if no answer arrives in time; a late answer is never returned.
    fn best_move(
        &mut self,
        fen: &str,
        budget: Duration,
    ) -> impl Future<Output = Result<String, EngineError>> + Send;

    /// Releases the engine (stops the process, frees resources).
    fn shutdown(self) -> impl Future<Output = ()> + Send;
}
