//! The session core: seats, game state, and clock under one owner.
//!
//! [`Session`] is plain synchronous data. It has no locks and spawns
//! nothing; the actor in [`actor`](crate::actor) owns one and is the only
//! thing that ever calls its `&mut self` methods, which is what serializes
//! joins, moves, resignations, and clock ticks against each other.

use chrono::{DateTime, Utc};
use gambit_clock::Clock;
use gambit_protocol::{
    AccessToken, BoardView, MoveResult, Outcome, RemainingView, SessionId,
    SessionStatus, SessionSummary, Side, TurnView,
};
use gambit_rules::{Notation, Rules};
use std::time::Duration;
use tokio::time::Instant;

use crate::{SessionError, SessionPhase};

/// Identity shown in the automated opponent's seat.
pub const AUTOMATED_IDENTITY: &str = "engine";

/// An occupied seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub identity: String,
    pub token: AccessToken,
}

impl Seat {
    pub fn new(identity: impl Into<String>, token: AccessToken) -> Self {
        Self {
            identity: identity.into(),
            token,
        }
    }
}

/// One game between two seats.
///
/// Seats are indexed by [`Side::index`]. A seat, once filled, is never
/// reassigned.
pub struct Session<R: Rules> {
    id: SessionId,
    name: String,
    created_at: DateTime<Utc>,
    seats: [Option<Seat>; 2],
    automated: Option<Side>,
    state: R::State,
    notation: Notation,
    outcome: Outcome,
    clock: Clock,
    phase: SessionPhase,
}

impl<R: Rules> Session<R> {
    /// Creates a session with `creator` in the first-mover's seat and the
    /// clock already running.
    pub fn new(
        id: SessionId,
        name: impl Into<String>,
        creator: Seat,
        allotment: Duration,
    ) -> Self {
        let state = R::new_game();
        let mut seats = [None, None];
        seats[Side::FIRST.index()] = Some(creator);

        Self {
            id,
            name: name.into(),
            created_at: Utc::now(),
            seats,
            automated: None,
            notation: R::serialize(&state),
            outcome: R::outcome(&state),
            state,
            clock: Clock::new(allotment),
            phase: SessionPhase::Open,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn automated_side(&self) -> Option<Side> {
        self.automated
    }

    pub fn seat(&self, side: Side) -> Option<&Seat> {
        self.seats[side.index()].as_ref()
    }

    /// The side `token` sits on, if any.
    pub fn side_of(&self, token: &AccessToken) -> Option<Side> {
        Side::ALL.into_iter().find(|side| {
            self.seat(*side).is_some_and(|seat| &seat.token == token)
        })
    }

    fn free_side(&self) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| self.seats[side.index()].is_none())
    }

    /// Seats `identity` in the first empty slot.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyJoined`] if `token` already has a seat
    /// - [`SessionError::Full`] if no seat is free
    /// - [`SessionError::Finished`] if the game ended before anyone joined,
    ///   including the creator running out of time while waiting
    pub fn join(
        &mut self,
        identity: impl Into<String>,
        token: AccessToken,
    ) -> Result<Side, SessionError> {
        if let Some(side) = self.side_of(&token) {
            return Err(SessionError::AlreadyJoined(side));
        }
        let side = self.free_side().ok_or(SessionError::Full(self.id))?;
        if !self.phase.is_terminal() {
            self.charge_clock();
        }
        if self.phase.is_terminal() {
            return Err(SessionError::Finished(self.id));
        }

        self.seats[side.index()] = Some(Seat::new(identity, token));
        self.set_phase(SessionPhase::Active);
        Ok(side)
    }

    /// Seats the automated opponent under `token` and marks its side.
    pub fn reserve_automated(
        &mut self,
        token: AccessToken,
    ) -> Result<Side, SessionError> {
        let side = self.join(AUTOMATED_IDENTITY, token)?;
        self.automated = Some(side);
        Ok(side)
    }

    /// Plays `notation` for the side `token` sits on.
    ///
    /// Checks run in a fixed order: seat, finished game, clock, turn, and
    /// only then legality. If the side to move has run out of time, the
    /// game ends on time here whatever was played and whoever played it:
    /// a stalled opponent loses as soon as the other side tries to move.
    pub fn submit_move(
        &mut self,
        token: &AccessToken,
        notation: &str,
    ) -> Result<MoveResult, SessionError> {
        let side = self.side_of(token).ok_or(SessionError::Unauthorized)?;
        if self.phase.is_terminal() {
            return Err(SessionError::GameOver);
        }
        if let Some(flagged) = self.charge_clock() {
            return Err(SessionError::ClockExpired {
                side: flagged,
                result: self.move_result(),
            });
        }
        if side != self.clock.active_side() {
            return Err(SessionError::NotYourTurn(side));
        }

        let next = R::apply_move(&self.state, notation)?;
        self.clock.advance();
        self.commit(next);
        Ok(self.move_result())
    }

    /// Resigns for the side `token` sits on, whoever's turn it is.
    ///
    /// Resigning a finished game changes nothing and returns its result.
    /// A flag that fell before the resignation decides the game first.
    pub fn resign(
        &mut self,
        token: &AccessToken,
    ) -> Result<MoveResult, SessionError> {
        let side = self.side_of(token).ok_or(SessionError::Unauthorized)?;
        if !self.phase.is_terminal() && self.charge_clock().is_none() {
            let next = R::resign(&self.state, side);
            self.commit(next);
        }
        Ok(self.move_result())
    }

    /// Charges elapsed time to the active side and ends the game if a
    /// clock has run out. Returns the side that lost on time.
    pub fn tick(&mut self) -> Option<Side> {
        if self.phase.is_terminal() {
            return None;
        }
        self.charge_clock()
    }

    /// Charges elapsed time and records a loss on time for a side that has
    /// run out. Every mutation goes through here before anything else, so
    /// a fallen flag is never overtaken by a move or a resignation.
    fn charge_clock(&mut self) -> Option<Side> {
        self.clock.tick();
        let side = self.clock.expired_side()?;
        let next = R::time_out(&self.state, side);
        self.commit(next);
        Some(side)
    }

    fn commit(&mut self, state: R::State) {
        self.notation = R::serialize(&state);
        self.outcome = R::outcome(&state);
        self.state = state;
        if self.outcome.is_decided() {
            self.set_phase(SessionPhase::Terminal);
        }
    }

    fn set_phase(&mut self, target: SessionPhase) {
        if self.phase.can_transition_to(target) {
            self.phase = target;
        }
    }

    pub fn move_result(&self) -> MoveResult {
        MoveResult {
            outcome: self.outcome.result,
            method: self.outcome.method,
            fen: self.notation.fen.clone(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let identity = |side: Side| self.seat(side).map(|s| s.identity.clone());
        SessionSummary {
            session_id: self.id,
            name: self.name.clone(),
            white: identity(Side::White),
            black: identity(Side::Black),
            automated: self.automated,
            status: status_of(self.phase),
            outcome: self.outcome.result,
            created_at: self.created_at,
        }
    }

    /// An immutable snapshot for readers outside the actor.
    pub fn view(&self) -> SessionView {
        SessionView {
            summary: self.summary(),
            phase: self.phase,
            turn: R::turn(&self.state),
            board: BoardView {
                fen: self.notation.fen.clone(),
                pgn: self.notation.pgn.clone(),
                outcome: self.outcome.result,
                method: self.outcome.method,
            },
            clock: self.clock.clone(),
            tokens: self.seats.clone().map(|seat| seat.map(|s| s.token)),
        }
    }
}

fn status_of(phase: SessionPhase) -> SessionStatus {
    match phase {
        SessionPhase::Open => SessionStatus::Open,
        SessionPhase::Active => SessionStatus::Playing,
        SessionPhase::Terminal => SessionStatus::Finished,
    }
}

// ---------------------------------------------------------------------------
// SessionView
// ---------------------------------------------------------------------------

/// Read-only snapshot of a session, published after every change.
///
/// Remaining time is projected from the clock copy at read time, so a
/// snapshot stays accurate between ticks. Once the session is terminal
/// the clock is frozen.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub summary: SessionSummary,
    pub phase: SessionPhase,
    pub turn: Side,
    pub board: BoardView,
    clock: Clock,
    tokens: [Option<AccessToken>; 2],
}

impl SessionView {
    pub fn side_of(&self, token: &AccessToken) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| self.tokens[side.index()].as_ref() == Some(token))
    }

    pub fn remaining_for(&self, side: Side) -> Duration {
        self.remaining_at(side, Instant::now())
    }

    pub fn remaining_at(&self, side: Side, now: Instant) -> Duration {
        if self.phase.is_terminal() {
            return self.clock.remaining_for(side);
        }
        let mut clock = self.clock.clone();
        clock.tick_at(now);
        clock.remaining_for(side)
    }

    /// Remaining time seen from `side`'s chair.
    pub fn remaining_view(&self, side: Side) -> RemainingView {
        let now = Instant::now();
        RemainingView::new(
            side,
            self.remaining_at(side, now),
            self.remaining_at(side.other(), now),
        )
    }

    pub fn turn_view(&self) -> TurnView {
        TurnView { turn: self.turn }
    }

    pub fn move_result(&self) -> MoveResult {
        MoveResult {
            outcome: self.board.outcome,
            method: self.board.method,
            fen: self.board.fen.clone(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for the synchronous session core.
    //!
    //! Time-dependent tests run on a paused Tokio clock and move it with
    //! `tokio::time::advance`, so nothing here sleeps.

    use super::*;
    use gambit_protocol::{GameResult, Method};
    use gambit_rules::ChessRules;

    const ALLOTMENT: Duration = Duration::from_secs(600);
    const START_FEN: &str =
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    // -- Helpers ----------------------------------------------------------

    fn tok(s: &str) -> AccessToken {
        AccessToken::from(s)
    }

    fn open_session() -> Session<ChessRules> {
        Session::new(
            SessionId::new(),
            "A",
            Seat::new("alice", tok("t1")),
            ALLOTMENT,
        )
    }

    fn full_session() -> Session<ChessRules> {
        let mut session = open_session();
        session.join("bob", tok("t2")).unwrap();
        session
    }

    // =====================================================================
    // new() / join()
    // =====================================================================

    #[test]
    fn test_new_creator_holds_white_and_session_is_open() {
        let session = open_session();

        assert_eq!(session.side_of(&tok("t1")), Some(Side::White));
        assert_eq!(session.phase(), SessionPhase::Open);
        assert_eq!(session.clock().active_side(), Side::White);

        let summary = session.summary();
        assert_eq!(summary.name, "A");
        assert_eq!(summary.white.as_deref(), Some("alice"));
        assert_eq!(summary.black, None);
        assert_eq!(summary.status, SessionStatus::Open);
        assert_eq!(session.view().board.fen, START_FEN);
    }

    #[test]
    fn test_join_second_token_takes_black_and_activates() {
        let mut session = open_session();

        assert_eq!(session.join("bob", tok("t2")), Ok(Side::Black));
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.summary().status, SessionStatus::Playing);
        assert_eq!(session.summary().black.as_deref(), Some("bob"));
    }

    #[test]
    fn test_join_existing_token_returns_already_joined() {
        let mut session = full_session();

        assert_eq!(
            session.join("alice", tok("t1")),
            Err(SessionError::AlreadyJoined(Side::White))
        );
        assert_eq!(
            session.join("bob", tok("t2")),
            Err(SessionError::AlreadyJoined(Side::Black))
        );
    }

    #[test]
    fn test_join_full_session_returns_full_and_keeps_seats() {
        let mut session = full_session();

        assert_eq!(
            session.join("carol", tok("t3")),
            Err(SessionError::Full(session.id()))
        );
        assert_eq!(session.summary().black.as_deref(), Some("bob"));
        assert_eq!(session.side_of(&tok("t3")), None);
    }

    #[test]
    fn test_reserve_automated_marks_black_and_fills_session() {
        let mut session = open_session();

        assert_eq!(session.reserve_automated(tok("bot")), Ok(Side::Black));
        assert_eq!(session.automated_side(), Some(Side::Black));
        assert_eq!(session.summary().black.as_deref(), Some(AUTOMATED_IDENTITY));
        assert_eq!(
            session.join("bob", tok("t2")),
            Err(SessionError::Full(session.id()))
        );
    }

    // =====================================================================
    // submit_move()
    // =====================================================================

    #[test]
    fn test_submit_move_alternates_turns() {
        let mut session = full_session();

        let result = session.submit_move(&tok("t1"), "e4").unwrap();
        assert_eq!(result.outcome, GameResult::Ongoing);
        assert_eq!(result.method, Method::NoMethod);
        assert!(result.fen.contains(" b "));
        assert_eq!(session.view().turn, Side::Black);
        assert_eq!(session.clock().active_side(), Side::Black);

        assert_eq!(
            session.submit_move(&tok("t1"), "e5"),
            Err(SessionError::NotYourTurn(Side::White))
        );

        session.submit_move(&tok("t2"), "e5").unwrap();
        assert_eq!(session.view().turn, Side::White);
    }

    #[test]
    fn test_submit_move_unknown_token_is_unauthorized_and_changes_nothing() {
        let mut session = full_session();
        let before = session.view();

        for _ in 0..2 {
            assert_eq!(
                session.submit_move(&tok("nobody"), "e4"),
                Err(SessionError::Unauthorized)
            );
        }

        let after = session.view();
        assert_eq!(after.board, before.board);
        assert_eq!(after.turn, Side::White);
    }

    #[test]
    fn test_submit_move_illegal_keeps_state_and_turn() {
        let mut session = full_session();

        assert_eq!(
            session.submit_move(&tok("t1"), "e5"),
            Err(SessionError::IllegalMove("e5".into()))
        );
        assert_eq!(session.view().board.fen, START_FEN);
        assert_eq!(session.clock().active_side(), Side::White);
    }

    #[test]
    fn test_submit_move_allowed_before_second_player_joins() {
        let mut session = open_session();

        session.submit_move(&tok("t1"), "d4").unwrap();
        assert_eq!(session.phase(), SessionPhase::Open);
        assert_eq!(session.view().turn, Side::Black);
    }

    #[test]
    fn test_submit_move_checkmate_makes_session_terminal() {
        let mut session = full_session();

        session.submit_move(&tok("t1"), "f3").unwrap();
        session.submit_move(&tok("t2"), "e5").unwrap();
        session.submit_move(&tok("t1"), "g4").unwrap();
        let result = session.submit_move(&tok("t2"), "Qh4#").unwrap();

        assert_eq!(result.outcome, GameResult::BlackWon);
        assert_eq!(result.method, Method::Checkmate);
        assert_eq!(session.phase(), SessionPhase::Terminal);
        assert_eq!(session.summary().status, SessionStatus::Finished);
        assert_eq!(
            session.submit_move(&tok("t1"), "e4"),
            Err(SessionError::GameOver)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_move_charges_elapsed_time_to_mover() {
        let mut session = full_session();

        tokio::time::advance(Duration::from_secs(3)).await;
        session.submit_move(&tok("t1"), "e4").unwrap();

        let clock = session.clock();
        assert_eq!(clock.remaining_for(Side::White), ALLOTMENT - Duration::from_secs(3));
        assert_eq!(clock.remaining_for(Side::Black), ALLOTMENT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_move_after_flag_fall_times_out_instead() {
        let mut session = Session::<ChessRules>::new(
            SessionId::new(),
            "blitz",
            Seat::new("alice", tok("t1")),
            Duration::from_secs(1),
        );
        session.join("bob", tok("t2")).unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        let err = session.submit_move(&tok("t1"), "e4").unwrap_err();

        let SessionError::ClockExpired { side, result } = err else {
            panic!("expected ClockExpired, got {err:?}");
        };
        assert_eq!(side, Side::White);
        assert_eq!(result.outcome, GameResult::BlackWon);
        assert_eq!(result.method, Method::Timeout);
        assert_eq!(result.fen, START_FEN);
        assert_eq!(session.phase(), SessionPhase::Terminal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_move_out_of_turn_after_opponent_flag_fell_ends_game() {
        let mut session = full_session();
        session.submit_move(&tok("t1"), "e4").unwrap();

        tokio::time::advance(ALLOTMENT + Duration::from_secs(1)).await;
        let err = session.submit_move(&tok("t1"), "d4").unwrap_err();

        match err {
            SessionError::ClockExpired { side, result } => {
                assert_eq!(side, Side::Black);
                assert_eq!(result.outcome, GameResult::WhiteWon);
                assert_eq!(result.method, Method::Timeout);
            }
            other => panic!("expected ClockExpired, got {other:?}"),
        }
        assert_eq!(session.phase(), SessionPhase::Terminal);
        assert_eq!(session.view().board.pgn, "1. e4 1-0");
        assert_eq!(
            session.submit_move(&tok("t2"), "e5"),
            Err(SessionError::GameOver)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_after_creator_flag_fell_is_finished() {
        let mut session = open_session();

        tokio::time::advance(ALLOTMENT).await;
        assert_eq!(
            session.join("bob", tok("t2")),
            Err(SessionError::Finished(session.id()))
        );
        assert_eq!(session.outcome(), Outcome::loss_for(Side::White, Method::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_move_expired_rejects_even_illegal_moves() {
        let mut session = Session::<ChessRules>::new(
            SessionId::new(),
            "blitz",
            Seat::new("alice", tok("t1")),
            Duration::from_secs(1),
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        let err = session.submit_move(&tok("t1"), "Ke9").unwrap_err();

        assert!(matches!(err, SessionError::ClockExpired { side: Side::White, .. }));
    }

    // =====================================================================
    // resign() / tick()
    // =====================================================================

    #[test]
    fn test_resign_out_of_turn_credits_opponent() {
        let mut session = full_session();

        let result = session.resign(&tok("t2")).unwrap();
        assert_eq!(result.outcome, GameResult::WhiteWon);
        assert_eq!(result.method, Method::Resignation);
        assert_eq!(session.phase(), SessionPhase::Terminal);

        // A second resignation doesn't flip the result.
        let again = session.resign(&tok("t1")).unwrap();
        assert_eq!(again, result);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resign_after_opponent_flag_fell_is_loss_on_time() {
        let mut session = full_session();
        session.submit_move(&tok("t1"), "e4").unwrap();

        // Black stalls past the allotment; nothing has ticked since.
        tokio::time::advance(ALLOTMENT + Duration::from_secs(1)).await;
        let result = session.resign(&tok("t1")).unwrap();

        assert_eq!(result.outcome, GameResult::WhiteWon);
        assert_eq!(result.method, Method::Timeout);
        assert_eq!(session.phase(), SessionPhase::Terminal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resign_after_own_flag_fell_is_loss_on_time() {
        let mut session = full_session();

        tokio::time::advance(ALLOTMENT).await;
        let result = session.resign(&tok("t2")).unwrap();

        assert_eq!(result.outcome, GameResult::BlackWon);
        assert_eq!(result.method, Method::Timeout);
    }

    #[test]
    fn test_resign_unknown_token_is_unauthorized() {
        let mut session = full_session();
        assert_eq!(
            session.resign(&tok("nobody")),
            Err(SessionError::Unauthorized)
        );
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_detects_expiry_of_active_side() {
        let mut session = full_session();
        session.submit_move(&tok("t1"), "e4").unwrap();

        tokio::time::advance(ALLOTMENT - Duration::from_millis(1)).await;
        assert_eq!(session.tick(), None);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(session.tick(), Some(Side::Black));
        assert_eq!(session.outcome(), Outcome::loss_for(Side::Black, Method::Timeout));
        assert_eq!(session.phase(), SessionPhase::Terminal);

        // Terminal sessions stop charging time.
        assert_eq!(session.tick(), None);
    }

    // =====================================================================
    // SessionView
    // =====================================================================

    #[tokio::test(start_paused = true)]
    async fn test_view_projects_remaining_time_between_ticks() {
        let mut session = full_session();
        let view = session.view();

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(view.remaining_for(Side::White), ALLOTMENT - Duration::from_secs(5));
        assert_eq!(view.remaining_for(Side::Black), ALLOTMENT);

        let remaining = view.remaining_view(Side::Black);
        assert_eq!(remaining.side, Side::Black);
        assert_eq!(remaining.player, "10:00");
        assert_eq!(remaining.opponent, "09:55");

        session.resign(&tok("t1")).unwrap();
        let frozen = session.view();
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(frozen.remaining_for(Side::White), ALLOTMENT - Duration::from_secs(5));
    }

    #[test]
    fn test_view_side_of_resolves_tokens() {
        let view = full_session().view();
        assert_eq!(view.side_of(&tok("t1")), Some(Side::White));
        assert_eq!(view.side_of(&tok("t2")), Some(Side::Black));
        assert_eq!(view.side_of(&tok("t3")), None);
    }
}
