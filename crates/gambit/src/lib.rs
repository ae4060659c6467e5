//! # Gambit
//!
//! A two-player chess session server with per-side clocks and optional
//! engine opponents, served over plain HTTP.
//!
//! Participants log in for a token, create or join a session, and play by
//! submitting moves. Each session runs as its own actor with a running
//! clock; an automated opponent, if requested, plays one side through an
//! external UCI engine.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gambit::prelude::*;
//!
//! # async fn run() -> Result<(), GambitError> {
//! let server = GambitServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::GambitError;
pub use server::{GambitServer, GambitServerBuilder};

pub mod prelude {
    pub use crate::{GambitError, GambitServer, GambitServerBuilder};
    pub use gambit_clock::TickConfig;
    pub use gambit_engine::{EngineLauncher, MoveEngine, UciConfig, UciLauncher};
    pub use gambit_protocol::{
        AccessToken, BoardView, CreateResponse, GameResult, JoinResponse, LoginResponse, Method,
        MoveResult, RemainingView, SessionId, SessionStatus, SessionSummary, Side, TurnView,
    };
    pub use gambit_session::{DriverConfig, SessionConfig};
}
