//! Game clock and tick scheduler for Gambit.
//!
//! Two pieces live here:
//!
//! - [`Clock`]: a dual countdown timer. Exactly one side's time runs at
//!   any instant; every accepted move calls [`Clock::advance`] to charge
//!   the mover and hand the clock to the opponent.
//! - [`ClockTicker`]: a fixed-interval scheduler that wakes the owning
//!   session so it can call [`Clock::tick`] and notice expiry even when
//!   nobody is moving.
//!
//! # Integration
//!
//! The ticker is designed to sit inside a session actor's `tokio::select!`
//! loop next to the command channel, so ticks and moves are serialized
//! through the same task:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* join, move, resign */ }
//!         _ = ticker.wait_for_tick() => {
//!             session.tick();
//!         }
//!     }
//! }
//! ```
//!
//! Both types read time from `tokio::time::Instant`, so tests can pause
//! and advance the runtime clock instead of sleeping.

mod clock;
mod ticker;

pub use clock::Clock;
pub use ticker::{ClockTicker, TickConfig, TickInfo, TickMetrics};
