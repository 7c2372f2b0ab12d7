use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::{
    types::{PlaylistSummary, TrackDescriptor},
    utils,
};

const SESSION_KEY_LEN: usize = 48;

/// Credentials of a logged in user. Only the refresh token is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub refresh_token: String,
    pub access_token: String,
}

/// Tracks sampled from a source playlist, waiting to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledTracks {
    pub source_playlist_id: String,
    pub tracks: Vec<TrackDescriptor>,
}

/// Everything the server keeps for one browser session.
///
/// `sources` and `destinations` hold the last playlist listings shown to the
/// user; form submissions are validated against them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub credentials: Credentials,
    pub sources: Vec<PlaylistSummary>,
    pub destinations: Vec<PlaylistSummary>,
    pub sampled: Option<SampledTracks>,
}

impl SessionContext {
    pub fn new(credentials: Credentials) -> Self {
        SessionContext {
            credentials,
            sources: Vec::new(),
            destinations: Vec::new(),
            sampled: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.credentials.user_id
    }

    pub fn has_sample(&self) -> bool {
        self.sampled
            .as_ref()
            .is_some_and(|sampled| !sampled.tracks.is_empty())
    }

    pub fn source(&self, playlist_id: &str) -> Option<&PlaylistSummary> {
        self.sources.iter().find(|p| p.id == playlist_id)
    }

    pub fn destination(&self, playlist_id: &str) -> Option<&PlaylistSummary> {
        self.destinations.iter().find(|p| p.id == playlist_id)
    }
}

/// In-memory session contexts keyed by an opaque session key.
///
/// Handlers take a copy with [`SessionManager::get`], run their pipeline on it
/// and store the result with [`SessionManager::put`]. The lock is never held
/// while a remote call is in flight.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: Mutex<HashMap<String, SessionContext>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new context and returns the key for the session cookie.
    ///
    /// Existing sessions of the same user are evicted.
    pub async fn create(&self, context: SessionContext) -> String {
        let key = utils::generate_token(SESSION_KEY_LEN);
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, existing| existing.user_id() != context.user_id());
        sessions.insert(key.clone(), context);
        key
    }

    pub async fn get(&self, key: &str) -> Option<SessionContext> {
        self.sessions.lock().await.get(key).cloned()
    }

    /// Writes back a context. A session evicted in the meantime stays evicted.
    pub async fn put(&self, key: &str, context: SessionContext) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(key) {
            Some(slot) => {
                *slot = context;
                true
            }
            None => false,
        }
    }

    pub async fn evict(&self, key: &str) -> Option<SessionContext> {
        self.sessions.lock().await.remove(key)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
