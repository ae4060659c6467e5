//! The token store: issues login tokens and resolves them.
//!
//! Every login mints a new token, even for an identity that already has
//! one, so the same person can play from two browsers. Tokens never
//! expire; the store lives exactly as long as the server.
//!
//! # Concurrency note
//!
//! Logins are rare and lookups happen on every request, so the map sits
//! behind a `tokio::sync::RwLock`: any number of handlers can resolve
//! tokens at once and only `login` takes the write half.

use std::collections::HashMap;

use gambit_protocol::AccessToken;
use tokio::sync::RwLock;

use crate::{AuthError, Authenticator};

/// In-memory token → identity table.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: RwLock<HashMap<AccessToken, String>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token for `identity`.
    ///
    /// # Errors
    /// [`AuthError::InvalidIdentity`] if `identity` is blank.
    pub async fn login(
        &self,
        identity: &str,
    ) -> Result<AccessToken, AuthError> {
        if identity.trim().is_empty() {
            return Err(AuthError::InvalidIdentity(identity.to_string()));
        }

        let token = AccessToken::generate();
        self.tokens
            .write()
            .await
            .insert(token.clone(), identity.to_string());

        tracing::info!(identity, ?token, "login token issued");
        Ok(token)
    }

    /// Returns the identity behind `token`, if it was issued here.
    pub async fn identity(&self, token: &AccessToken) -> Option<String> {
        self.tokens.read().await.get(token).cloned()
    }

    /// Number of tokens issued so far.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

impl Authenticator for TokenStore {
    async fn authenticate(
        &self,
        token: &AccessToken,
    ) -> Result<String, AuthError> {
        self.identity(token).await.ok_or(AuthError::Unauthorized)
    }
}

// =========================================================================
// Tests
// =========================================================================
