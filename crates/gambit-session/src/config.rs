//! Session configuration and phase state machine.

use std::time::Duration;

use gambit_clock::TickConfig;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Settings shared by every session a service creates.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Time each side starts with.
    ///
    /// Default: 10 minutes.
    pub allotment: Duration,

    /// Background clock ticker settings. Ticks only detect expiry; moves
    /// charge time on their own, so a disabled ticker only delays the
    /// timeout until the stalling side next tries to move.
    pub tick: TickConfig,

    /// Capacity of each session actor's command channel. Callers wait
    /// when it is full.
    pub channel_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            allotment: Duration::from_secs(600),
            tick: TickConfig::default(),
            channel_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a session.
///
/// Transitions only move forward:
///
/// ```text
/// Open → Active → Terminal
///   └──────────────↗
/// ```
///
/// - **Open**: one seat is still empty.
/// - **Active**: both seats are taken (or one seat plus the automated
///   opponent) and no result is decided.
/// - **Terminal**: a result is decided. Only read-only queries do anything
///   useful from here.
///
/// An open session can become terminal directly, when the creator resigns
/// or runs out of time before anyone joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Open,
    Active,
    Terminal,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// Returns `true` if `target` is reachable from here in one step.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::Active)
                | (Self::Open, Self::Terminal)
                | (Self::Active, Self::Terminal)
        )
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Active => write!(f, "Active"),
            Self::Terminal => write!(f, "Terminal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_phase_transitions_only_move_forward() {
        use SessionPhase::*;

        assert!(Open.can_transition_to(Active));
        assert!(Open.can_transition_to(Terminal));
        assert!(Active.can_transition_to(Terminal));

        assert!(!Active.can_transition_to(Open));
        assert!(!Terminal.can_transition_to(Open));
        assert!(!Terminal.can_transition_to(Active));
        assert!(!Terminal.can_transition_to(Terminal));
        assert!(!Open.can_transition_to(Open));
    }

    #[test]
    fn test_session_phase_is_terminal() {
        assert!(!SessionPhase::Open.is_terminal());
        assert!(!SessionPhase::Active.is_terminal());
        assert!(SessionPhase::Terminal.is_terminal());
    }

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.allotment, Duration::from_secs(600));
        assert_eq!(config.tick.interval, Some(Duration::from_millis(100)));
        assert_eq!(config.channel_size, 64);
    }
}
