//! Session registry: the process's table of live sessions.

use std::collections::HashMap;

use gambit_protocol::SessionId;
use tokio::sync::RwLock;

use crate::{SessionError, SessionHandle};

/// Concurrent map from session ID to [`SessionHandle`].
///
/// Entries are added once and never removed. The lock only guards the
/// map itself. Session state lives in each actor, so holding the read
/// half while visiting entries never blocks a move in progress, and
/// inserts only wait for readers that are copying handles out.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Entry>>,
}

#[derive(Debug)]
struct Entry {
    /// Registration order, used to break creation-time ties in listings.
    seq: u64,
    handle: SessionHandle,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` under its ID.
    ///
    /// # Errors
    /// [`SessionError::Duplicate`] if the ID is already present.
    pub async fn insert(&self, handle: SessionHandle) -> Result<(), SessionError> {
        let id = handle.id();
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&id) {
            return Err(SessionError::Duplicate(id));
        }
        let seq = sessions.len() as u64;
        sessions.insert(id, Entry { seq, handle });
        tracing::debug!(session_id = %id, seq, "session registered");
        Ok(())
    }

    pub async fn lookup(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|entry| entry.handle.clone())
    }

    /// Like [`lookup`](Self::lookup), with a missing ID as an error.
    pub async fn get(&self, id: SessionId) -> Result<SessionHandle, SessionError> {
        self.lookup(id).await.ok_or(SessionError::NotFound(id))
    }

    /// Calls `visitor` with every handle and its registration number.
    ///
    /// Visiting order is unspecified. The visitor runs under the read lock,
    /// so it should only copy out what it needs.
    pub async fn for_each(&self, mut visitor: impl FnMut(u64, &SessionHandle)) {
        for entry in self.sessions.read().await.values() {
            visitor(entry.seq, &entry.handle);
        }
    }

    /// Cloned handles to every session, in registration order.
    pub async fn handles(&self) -> Vec<SessionHandle> {
        let mut entries = Vec::new();
        self.for_each(|seq, handle| entries.push((seq, handle.clone())))
            .await;
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, handle)| handle).collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
