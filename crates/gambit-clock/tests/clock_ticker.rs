//! Integration tests for the clock and its ticker.
//!
//! Uses `tokio::time::pause()` to control time deterministically. With a
//! paused runtime, `Instant::now()` only moves when the test advances it,
//! so clock balances can be compared exactly.

use std::time::Duration;

use gambit_clock::{Clock, ClockTicker, TickConfig};
use gambit_protocol::Side;

// =========================================================================
// Helpers
// =========================================================================

fn config_100ms() -> TickConfig {
    TickConfig {
        initial_jitter_us: 0,
        ..TickConfig::every(Duration::from_millis(100))
    }
}

const TEN_MIN: Duration = Duration::from_secs(600);

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_ticks_every_100ms() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.interval, Some(Duration::from_millis(100)));
}

#[test]
fn test_disabled_config_has_no_interval() {
    assert_eq!(TickConfig::disabled().interval, None);
    assert_eq!(
        TickConfig::every(Duration::from_millis(250)).interval,
        Some(Duration::from_millis(250))
    );
}

#[test]
fn test_validated_clamps_tiny_interval() {
    let cfg = TickConfig::every(Duration::from_micros(10)).validated();
    assert_eq!(cfg.interval, Some(TickConfig::MIN_INTERVAL));
}

// =========================================================================
// Ticker
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_tick_fires_and_increments() {
    let mut t = ClockTicker::new(config_100ms());

    let info = t.wait_for_tick().await;
    assert_eq!(info.tick, 1);
    assert!(!info.overrun);
    assert_eq!(t.metrics().total_ticks, 1);
    assert_eq!(t.metrics().total_skipped, 0);
}

#[tokio::test(start_paused = true)]
async fn test_multiple_ticks_increment_monotonically() {
    let mut t = ClockTicker::new(config_100ms());

    for expected in 1..=5 {
        let info = t.wait_for_tick().await;
        assert_eq!(info.tick, expected);
    }
    assert_eq!(t.metrics().total_ticks, 5);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_ticker_never_fires() {
    let mut t = ClockTicker::new(TickConfig::disabled());

    let result = tokio::time::timeout(Duration::from_secs(5), t.wait_for_tick()).await;
    assert!(result.is_err(), "disabled ticker should pend forever");
}

#[tokio::test(start_paused = true)]
async fn test_pause_prevents_ticks() {
    let mut t = ClockTicker::new(config_100ms());
    t.wait_for_tick().await;

    t.pause();
    assert!(t.is_paused());

    let result = tokio::time::timeout(Duration::from_secs(1), t.wait_for_tick()).await;
    assert!(result.is_err(), "paused ticker should pend");
}

#[tokio::test(start_paused = true)]
async fn test_pause_twice_keeps_ticker_paused() {
    let mut t = ClockTicker::new(config_100ms());
    t.wait_for_tick().await;
    t.pause();
    t.pause();
    assert!(t.is_paused());

    tokio::time::advance(Duration::from_secs(10)).await;
    let result = tokio::time::timeout(Duration::from_secs(1), t.wait_for_tick()).await;
    assert!(result.is_err());
    assert_eq!(t.metrics().total_ticks, 1);
}

#[tokio::test(start_paused = true)]
async fn test_late_tick_is_reported_as_overrun() {
    let mut t = ClockTicker::new(config_100ms());
    t.wait_for_tick().await;

    // Nobody polls the ticker for half a second.
    tokio::time::advance(Duration::from_millis(550)).await;
    let info = t.wait_for_tick().await;

    assert!(info.overrun);
    assert_eq!(t.metrics().total_skipped, 4);
    assert_eq!(t.metrics().total_overruns, 1);
}

// =========================================================================
// Clock driven by a paused runtime
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_clock_conserves_time_while_white_active() {
    let mut clock = Clock::new(TEN_MIN);

    // Several ticks, no moves: white's balance plus time elapsed while
    // white was active must stay equal to the allotment.
    let mut elapsed = Duration::ZERO;
    for step in [3u64, 1, 7, 2] {
        tokio::time::advance(Duration::from_secs(step)).await;
        elapsed += Duration::from_secs(step);
        clock.tick();
        assert_eq!(clock.remaining_for(Side::White) + elapsed, TEN_MIN);
        assert_eq!(clock.remaining_for(Side::Black), TEN_MIN);
    }
}

#[tokio::test(start_paused = true)]
async fn test_clock_attributes_elapsed_to_exactly_one_side() {
    let mut clock = Clock::new(TEN_MIN);

    tokio::time::advance(Duration::from_secs(4)).await;
    clock.advance();
    tokio::time::advance(Duration::from_secs(9)).await;
    clock.tick();

    let white_used = TEN_MIN - clock.remaining_for(Side::White);
    let black_used = TEN_MIN - clock.remaining_for(Side::Black);
    assert_eq!(white_used, Duration::from_secs(4));
    assert_eq!(black_used, Duration::from_secs(9));
    assert_eq!(white_used + black_used, Duration::from_secs(13));
}

#[tokio::test(start_paused = true)]
async fn test_select_loop_detects_expiry_without_moves() {
    let mut ticker = ClockTicker::new(config_100ms());
    let mut clock = Clock::new(Duration::from_secs(1));
    let (_tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);

    let expired = loop {
        tokio::select! {
            Some(()) = rx.recv() => unreachable!("no commands are sent"),
            _ = ticker.wait_for_tick() => {
                clock.tick();
                if let Some(side) = clock.expired_side() {
                    break side;
                }
            }
        }
    };

    assert_eq!(expired, Side::White);
    // 1s allotment at 100ms per tick.
    assert_eq!(ticker.metrics().total_ticks, 10);
}
