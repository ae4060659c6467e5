//! Session service: the public operations, composed from the registry
//! and session handles.
//!
//! The service adds no rules of its own. Each operation looks the session
//! up, forwards to its actor (mutations) or reads its latest snapshot
//! (queries), and returns the answer.

use std::marker::PhantomData;
use std::sync::Arc;

use gambit_engine::EngineLauncher;
use gambit_protocol::{
    AccessToken, BoardView, MoveResult, RemainingView, SessionId, SessionSummary,
    Side, TurnView,
};
use gambit_rules::Rules;

use crate::actor::spawn_session;
use crate::driver::{DriverConfig, run_driver};
use crate::{Seat, Session, SessionConfig, SessionError, SessionHandle, SessionRegistry};

/// Public session operations over an injected [`SessionRegistry`].
///
/// `R` picks the rules every session is played under. `L` starts engines
/// for automated opponents; with no launcher configured, requests for one
/// are refused.
pub struct SessionService<R: Rules, L: EngineLauncher> {
    registry: Arc<SessionRegistry>,
    launcher: Option<Arc<L>>,
    config: SessionConfig,
    driver: DriverConfig,
    _rules: PhantomData<fn() -> R>,
}

impl<R: Rules, L: EngineLauncher> SessionService<R, L> {
    pub fn new(
        registry: Arc<SessionRegistry>,
        launcher: Option<Arc<L>>,
        config: SessionConfig,
        driver: DriverConfig,
    ) -> Self {
        Self {
            registry,
            launcher,
            config,
            driver,
            _rules: PhantomData,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// `true` if automated opponents can be requested.
    pub fn has_opponent(&self) -> bool {
        self.launcher.is_some()
    }

    /// Creates a session with the caller as White.
    ///
    /// With `automated` set, Black is seated immediately under a reserved
    /// token and a driver task is spawned to play it.
    ///
    /// # Errors
    /// - [`SessionError::InvalidInput`] if `name` is blank
    /// - [`SessionError::OpponentUnavailable`] if `automated` is set but no
    ///   launcher is configured
    pub async fn create(
        &self,
        name: &str,
        identity: &str,
        token: AccessToken,
        automated: bool,
    ) -> Result<SessionId, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidInput("session name is empty".into()));
        }
        let launcher = match (automated, &self.launcher) {
            (false, _) => None,
            (true, Some(launcher)) => Some(launcher.clone()),
            (true, None) => return Err(SessionError::OpponentUnavailable),
        };

        let id = SessionId::new();
        let mut session = Session::<R>::new(
            id,
            name,
            Seat::new(identity, token),
            self.config.allotment,
        );

        let automated_seat = match launcher {
            Some(launcher) => {
                let bot_token = AccessToken::generate();
                let side = session.reserve_automated(bot_token.clone())?;
                Some((launcher, side, bot_token))
            }
            None => None,
        };

        let handle = spawn_session(session, self.config.tick.clone(), self.config.channel_size);
        self.registry.insert(handle.clone()).await?;
        tracing::info!(session_id = %id, name, identity, automated, "session created");

        if let Some((launcher, side, bot_token)) = automated_seat {
            tokio::spawn(run_driver(
                launcher,
                handle,
                side,
                bot_token,
                self.driver.clone(),
            ));
        }

        Ok(id)
    }

    /// Seats the caller in the free seat of session `id`.
    pub async fn join(
        &self,
        id: SessionId,
        identity: &str,
        token: AccessToken,
    ) -> Result<(Side, SessionSummary), SessionError> {
        let handle = self.registry.get(id).await?;
        let side = handle.join(identity, token).await?;
        Ok((side, handle.snapshot().summary.clone()))
    }

    pub async fn submit_move(
        &self,
        id: SessionId,
        token: AccessToken,
        notation: &str,
    ) -> Result<MoveResult, SessionError> {
        let notation = notation.trim();
        if notation.is_empty() {
            return Err(SessionError::InvalidInput("move is empty".into()));
        }
        self.registry.get(id).await?.submit_move(token, notation).await
    }

    pub async fn resign(
        &self,
        id: SessionId,
        token: AccessToken,
    ) -> Result<MoveResult, SessionError> {
        self.registry.get(id).await?.resign(token).await
    }

    pub async fn turn(&self, id: SessionId) -> Result<TurnView, SessionError> {
        Ok(self.registry.get(id).await?.snapshot().turn_view())
    }

    pub async fn board(&self, id: SessionId) -> Result<BoardView, SessionError> {
        Ok(self.registry.get(id).await?.snapshot().board.clone())
    }

    /// Remaining time from the caller's side of the board.
    ///
    /// # Errors
    /// [`SessionError::Unauthorized`] if `token` has no seat here.
    pub async fn remaining(
        &self,
        id: SessionId,
        token: &AccessToken,
    ) -> Result<RemainingView, SessionError> {
        let view = self.registry.get(id).await?.snapshot();
        let side = view.side_of(token).ok_or(SessionError::Unauthorized)?;
        Ok(view.remaining_view(side))
    }

    pub async fn info(&self, id: SessionId) -> Result<SessionSummary, SessionError> {
        Ok(self.registry.get(id).await?.snapshot().summary.clone())
    }

    /// Every session ordered by creation time, skipping the first `offset`.
    ///
    /// Each summary comes from that session's own latest snapshot; there
    /// is no global lock over the listing.
    pub async fn list(&self, offset: usize) -> Vec<SessionSummary> {
        // `handles()` is in registration order, and the sort is stable,
        // so equal timestamps keep that order.
        let mut summaries: Vec<SessionSummary> = self
            .registry
            .handles()
            .await
            .iter()
            .map(|handle| handle.snapshot().summary.clone())
            .collect();
        summaries.sort_by_key(|summary| summary.created_at);
        summaries.into_iter().skip(offset).collect()
    }

    /// Direct access to a session's handle.
    pub async fn handle(&self, id: SessionId) -> Result<SessionHandle, SessionError> {
        self.registry.get(id).await
    }
}
