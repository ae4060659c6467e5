//! Session lifecycle management for Gambit.
//!
//! Each session runs as an isolated Tokio task (actor model) that owns its
//! seats, game state, and clock. Sessions that play against an automated
//! opponent get a second task, the driver, which plays through the same
//! front door as a human.
//!
//! # Key types
//!
//! - [`Session`]: the synchronous core: seats, turn and clock checks
//! - [`SessionHandle`]: send commands to a running session actor, read
//!   its latest [`SessionView`]
//! - [`SessionRegistry`]: the injected table of live sessions
//! - [`SessionService`]: create, join, move, resign, and query
//! - [`run_driver`]: the automated-opponent loop
//! - [`SessionPhase`]: lifecycle state machine
//! - [`SessionConfig`] / [`DriverConfig`]: settings

mod actor;
mod config;
mod driver;
mod error;
mod registry;
mod service;
mod session;

pub use actor::SessionHandle;
pub use config::{SessionConfig, SessionPhase};
pub use driver::{DriverConfig, DriverExit, run_driver};
pub use error::{ErrorKind, SessionError};
pub use registry::SessionRegistry;
pub use service::SessionService;
pub use session::{AUTOMATED_IDENTITY, Seat, Session, SessionView};

/// Starts a session actor for `session` and returns its handle.
///
/// [`SessionService::create`] does this for you; this entry point exists
/// for callers that assemble sessions by hand, such as tests.
pub fn spawn<R: gambit_rules::Rules>(
    session: Session<R>,
    config: &SessionConfig,
) -> SessionHandle {
    actor::spawn_session(session, config.tick.clone(), config.channel_size)
}
