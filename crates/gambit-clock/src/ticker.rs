//! Fixed-interval tick scheduler that drives clock expiry checks.
//!
//! # Disabled mode
//!
//! When `interval` is `None`, [`ClockTicker::wait_for_tick`] pends forever.
//! Expiry is then only noticed when the session next handles a command.
//! Servers always run with an interval; tests use the disabled mode to
//! control exactly when time is charged.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the clock ticker.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks. `None` disables the ticker.
    pub interval: Option<Duration>,
    /// Random jitter (0–max µs) added to the *first* tick so sessions
    /// created in the same instant don't all tick together.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Some(Duration::from_millis(100)),
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    /// Shortest interval accepted; anything faster is clamped.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(5);

    /// A ticker firing every `interval`.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
            ..Default::default()
        }
    }

    /// A ticker that never fires.
    pub fn disabled() -> Self {
        Self {
            interval: None,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`ClockTicker::new`].
    pub fn validated(mut self) -> Self {
        if let Some(interval) = self.interval {
            if interval < Self::MIN_INTERVAL {
                warn!(
                    interval_ms = interval.as_secs_f64() * 1000.0,
                    min_ms = Self::MIN_INTERVAL.as_millis() as u64,
                    "tick interval below minimum, clamping"
                );
                self.interval = Some(Self::MIN_INTERVAL);
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info and metrics
// ---------------------------------------------------------------------------

/// Returned by [`ClockTicker::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// `true` if the tick fired noticeably late.
    pub overrun: bool,
}

/// Counters kept by the ticker, reported when its session finishes.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Fixed-interval scheduler. One per session actor.
///
/// Late ticks are never replayed: a tick that fires late schedules the
/// next one from *now*. Clock charging is based on wall-clock elapsed time
/// rather than tick counts, so a skipped tick loses no accuracy, only
/// expiry-detection latency.
pub struct ClockTicker {
    config: TickConfig,
    tick_count: u64,
    next_tick: Option<Instant>,
    paused: bool,
    metrics: TickMetrics,
}

impl ClockTicker {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();

        let next_tick = config.interval.map(|d| {
            let jitter = if config.initial_jitter_us > 0 {
                let us = rand::rng().random_range(0..config.initial_jitter_us);
                Duration::from_micros(us)
            } else {
                Duration::ZERO
            };
            Instant::now() + d + jitter
        });

        match config.interval {
            None => debug!("clock ticker created disabled"),
            Some(interval) => debug!(
                interval_ms = interval.as_secs_f64() * 1000.0,
                "clock ticker created"
            ),
        }

        Self {
            config,
            tick_count: 0,
            next_tick,
            paused: false,
            metrics: TickMetrics::default(),
        }
    }

    /// Waits until the next tick is due.
    ///
    /// When disabled or paused this future never resolves, but other
    /// `tokio::select!` branches keep running.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let (next, interval) = match (self.next_tick, self.config.interval) {
            (Some(next), Some(interval)) if !self.paused => (next, interval),
            _ => std::future::pending().await,
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        self.tick_count += 1;

        // More than 10% late counts as an overrun.
        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > interval / 10;
        let mut ticks_skipped = 0u64;
        if overrun {
            ticks_skipped = (late_by.as_nanos() / interval.as_nanos()) as u64;
            if ticks_skipped > 0 {
                warn!(
                    tick = self.tick_count,
                    skipped = ticks_skipped,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "clock tick overrun, skipping ahead"
                );
            }
            self.metrics.total_overruns += 1;
        }
        self.next_tick = Some(now + interval);

        self.metrics.total_skipped += ticks_skipped;
        self.metrics.total_ticks += 1;

        trace!(tick = self.tick_count, overrun, "clock tick");

        TickInfo {
            tick: self.tick_count,
            overrun,
        }
    }

    /// Stops ticking for good. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "clock ticker paused");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }
}
