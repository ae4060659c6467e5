//! The dual countdown clock.

use std::time::Duration;

use gambit_protocol::Side;
use tokio::time::Instant;

/// Per-session chess clock.
///
/// `remaining` is indexed by [`Side::index`]. Time elapsed since
/// `last_tick_at` has not been charged to anyone yet; it always belongs to
/// `active`, which is what keeps the two balances honest.
///
/// A balance never goes below zero; once a side runs out, further ticks
/// leave it there.
#[derive(Debug, Clone)]
pub struct Clock {
    remaining: [Duration; 2],
    active: Side,
    last_tick_at: Instant,
}

impl Clock {
    /// Starts a clock with `allotment` on both sides, first mover active.
    pub fn new(allotment: Duration) -> Self {
        Self::starting_at(allotment, Instant::now())
    }

    /// Same as [`new`](Self::new) with an explicit start instant.
    pub fn starting_at(allotment: Duration, now: Instant) -> Self {
        Self {
            remaining: [allotment; 2],
            active: Side::FIRST,
            last_tick_at: now,
        }
    }

    /// Charges the time elapsed since the last tick to the active side.
    ///
    /// Calling it twice at the same instant charges nothing the second time.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_tick_at);
        let i = self.active.index();
        self.remaining[i] = self.remaining[i].saturating_sub(elapsed);
        self.last_tick_at = now;
    }

    /// Ticks, then hands the clock to the other side.
    ///
    /// Called exactly once per accepted move.
    pub fn advance(&mut self) {
        self.advance_at(Instant::now());
    }

    pub fn advance_at(&mut self, now: Instant) {
        self.tick_at(now);
        self.active = self.active.other();
    }

    /// Time left for `side` as of the last tick.
    pub fn remaining_for(&self, side: Side) -> Duration {
        self.remaining[side.index()]
    }

    /// The side whose time is running.
    pub fn active_side(&self) -> Side {
        self.active
    }

    pub fn last_tick_at(&self) -> Instant {
        self.last_tick_at
    }

    /// `true` once either side has no time left.
    pub fn expired(&self) -> bool {
        self.expired_side().is_some()
    }

    /// The side that ran out, if any.
    ///
    /// Only the active side's balance ever decreases, so at most one side
    /// can be out at a time in practice; White is reported first otherwise.
    pub fn expired_side(&self) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| self.remaining[side.index()].is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN_MIN: Duration = Duration::from_secs(600);

    #[test]
    fn test_new_clock_gives_both_sides_the_allotment() {
        let clock = Clock::new(TEN_MIN);
        assert_eq!(clock.remaining_for(Side::White), TEN_MIN);
        assert_eq!(clock.remaining_for(Side::Black), TEN_MIN);
        assert_eq!(clock.active_side(), Side::White);
        assert!(!clock.expired());
    }

    #[test]
    fn test_tick_charges_only_the_active_side() {
        let t0 = Instant::now();
        let mut clock = Clock::starting_at(TEN_MIN, t0);

        clock.tick_at(t0 + Duration::from_secs(3));

        assert_eq!(clock.remaining_for(Side::White), TEN_MIN - Duration::from_secs(3));
        assert_eq!(clock.remaining_for(Side::Black), TEN_MIN);
    }

    #[test]
    fn test_tick_twice_at_same_instant_is_idempotent() {
        let t0 = Instant::now();
        let mut clock = Clock::starting_at(TEN_MIN, t0);
        let t1 = t0 + Duration::from_secs(5);

        clock.tick_at(t1);
        let after_first = clock.remaining_for(Side::White);
        clock.tick_at(t1);

        assert_eq!(clock.remaining_for(Side::White), after_first);
    }

    #[test]
    fn test_advance_switches_active_side() {
        let t0 = Instant::now();
        let mut clock = Clock::starting_at(TEN_MIN, t0);

        clock.advance_at(t0 + Duration::from_secs(2));
        assert_eq!(clock.active_side(), Side::Black);

        clock.advance_at(t0 + Duration::from_secs(9));
        assert_eq!(clock.active_side(), Side::White);
        assert_eq!(clock.remaining_for(Side::White), TEN_MIN - Duration::from_secs(2));
        assert_eq!(clock.remaining_for(Side::Black), TEN_MIN - Duration::from_secs(7));
    }

    #[test]
    fn test_tick_with_earlier_instant_charges_nothing() {
        let t0 = Instant::now();
        let mut clock = Clock::starting_at(TEN_MIN, t0 + Duration::from_secs(1));

        clock.tick_at(t0);

        assert_eq!(clock.remaining_for(Side::White), TEN_MIN);
    }

    #[test]
    fn test_running_out_clamps_to_zero() {
        let t0 = Instant::now();
        let mut clock = Clock::starting_at(Duration::from_secs(10), t0);

        clock.tick_at(t0 + Duration::from_secs(12));

        assert_eq!(clock.remaining_for(Side::White), Duration::ZERO);
        assert_eq!(clock.expired_side(), Some(Side::White));
        assert!(clock.expired());
    }

    #[test]
    fn test_exactly_zero_counts_as_expired() {
        let t0 = Instant::now();
        let mut clock = Clock::starting_at(Duration::from_secs(10), t0);

        clock.tick_at(t0 + Duration::from_secs(10));

        assert_eq!(clock.expired_side(), Some(Side::White));
    }
}
