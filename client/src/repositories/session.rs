use std::sync::Arc;

use tokio::sync::watch;

use super::repository::{JsonCollection, Repository};
use crate::{
    error::StorageError,
    models::{LoginHistoryEntry, Session},
    storage::KeyValueStore,
};

pub const ACTIVE_SESSIONS_KEY: &str = "activeSessions";
pub const LOGIN_HISTORY_KEY: &str = "loginHistory";
pub const LOGIN_HISTORY_LIMIT: usize = 50;

/// Active sessions and login history for this device.
///
/// Every write publishes the new collection on a watch channel so a settings
/// view can redraw from the value it receives instead of re-reading storage.
#[derive(Clone)]
pub struct SessionStore {
    sessions: JsonCollection<Session>,
    history: JsonCollection<LoginHistoryEntry>,
    sessions_tx: Arc<watch::Sender<Vec<Session>>>,
    history_tx: Arc<watch::Sender<Vec<LoginHistoryEntry>>>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let sessions = JsonCollection::new(store.clone(), ACTIVE_SESSIONS_KEY);
        let history = JsonCollection::new(store, LOGIN_HISTORY_KEY);
        let (sessions_tx, _) = watch::channel(sessions.load());
        let (history_tx, _) = watch::channel(history.load());
        Self {
            sessions,
            history,
            sessions_tx: Arc::new(sessions_tx),
            history_tx: Arc::new(history_tx),
        }
    }

    pub fn list_sessions(&self) -> Vec<Session> {
        self.sessions.load()
    }

    pub fn append_session(&self, session: Session) -> Result<(), StorageError> {
        let mut sessions = self.sessions.load();
        sessions.push(session);
        self.replace_all(sessions)
    }

    /// Overwrites the whole collection.
    pub fn replace_all(&self, sessions: Vec<Session>) -> Result<(), StorageError> {
        self.sessions.save(&sessions)?;
        tracing::debug!(count = sessions.len(), "active sessions updated");
        self.sessions_tx.send_replace(sessions);
        Ok(())
    }

    /// Newest first.
    pub fn list_login_history(&self) -> Vec<LoginHistoryEntry> {
        self.history.load()
    }

    /// Prepends `entry` and drops the oldest entries beyond the limit.
    pub fn append_login_history(&self, entry: LoginHistoryEntry) -> Result<(), StorageError> {
        let mut history = self.history.load();
        history.insert(0, entry);
        history.truncate(LOGIN_HISTORY_LIMIT);
        self.history.save(&history)?;
        self.history_tx.send_replace(history);
        Ok(())
    }

    pub fn subscribe_sessions(&self) -> watch::Receiver<Vec<Session>> {
        self.sessions_tx.subscribe()
    }

    pub fn subscribe_login_history(&self) -> watch::Receiver<Vec<LoginHistoryEntry>> {
        self.history_tx.subscribe()
    }
}

impl Repository<Session> for SessionStore {
    type Id = str;

    fn find_all(&self) -> Vec<Session> {
        self.list_sessions()
    }

    fn find_by_id(&self, id: &str) -> Option<Session> {
        self.list_sessions().into_iter().find(|s| s.id == id)
    }

    fn create(&self, item: Session) -> Result<Session, StorageError> {
        self.append_session(item.clone())?;
        Ok(item)
    }

    fn update(&self, item: Session) -> Result<bool, StorageError> {
        let mut sessions = self.list_sessions();
        let Some(slot) = sessions.iter_mut().find(|s| s.id == item.id) else {
            return Ok(false);
        };
        *slot = item;
        self.replace_all(sessions)?;
        Ok(true)
    }

    fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let mut sessions = self.list_sessions();
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            return Ok(false);
        }
        self.replace_all(sessions)?;
        Ok(true)
    }
}
