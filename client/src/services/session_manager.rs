//! Lifecycle of the session created by a login on this device.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::Utc;
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use uuid::Uuid;

use crate::{
    error::StorageError,
    models::{LoginHistoryEntry, LoginStatus, Session},
    repositories::{Repository, SessionStore},
    services::{
        device::{self, DeviceInfo},
        location::{LocationLookup, LocationProbe},
    },
    utils::time::now_millis,
};

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    NoSession,
    Active { session_id: String },
    /// The current session was terminated by id. Logout still resets to `NoSession`.
    Terminated { session_id: String },
}

impl SessionPhase {
    fn active_id(&self) -> Option<&str> {
        match self {
            SessionPhase::Active { session_id } => Some(session_id.as_str()),
            _ => None,
        }
    }
}

/// User input that counts as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    PointerDown,
    KeyDown,
    Scroll,
    Touch,
}

struct Inner {
    phase: SessionPhase,
    heartbeat: Option<JoinHandle<()>>,
    /// Only the first interaction per heartbeat window refreshes the session.
    interaction_armed: bool,
}

pub struct SessionManager {
    store: SessionStore,
    probe: Arc<dyn LocationProbe>,
    user_agent: String,
    heartbeat_interval: Duration,
    inner: Arc<Mutex<Inner>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn generate_session_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("session_{}_{}", now_millis(), &random[..9])
}

/// Sets `last_active` on the stored record with `id`. Missing records are left alone.
fn touch(store: &SessionStore, id: &str) {
    let Some(mut session) = store.find_by_id(id) else {
        return;
    };
    session.last_active = Utc::now();
    if let Err(err) = store.update(session) {
        tracing::warn!(session_id = id, error = %err, "failed to refresh last active");
    }
}

impl SessionManager {
    pub fn new(
        store: SessionStore,
        probe: Arc<dyn LocationProbe>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            store,
            probe,
            user_agent: user_agent.into(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            inner: Arc::new(Mutex::new(Inner {
                phase: SessionPhase::NoSession,
                heartbeat: None,
                interaction_armed: false,
            })),
        }
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn phase(&self) -> SessionPhase {
        lock(&self.inner).phase.clone()
    }

    pub fn device_info(&self) -> DeviceInfo {
        device::identify(&self.user_agent)
    }

    async fn probe(&self) -> (DeviceInfo, LocationLookup) {
        let info = self.device_info();
        let lookup = self.probe.locate().await;
        if lookup.is_degraded() {
            tracing::debug!(source = ?lookup.source, "using degraded location");
        }
        (info, lookup)
    }

    /// Records a new current session for this device and starts the heartbeat.
    ///
    /// Returns `None` if the session could not be stored. The caller's login
    /// should go ahead either way.
    pub async fn initialize_session(&self) -> Option<Session> {
        let (info, lookup) = self.probe().await;
        let now = Utc::now();
        let session = Session {
            id: generate_session_id(),
            device: info.device.clone(),
            device_type: info.device_type,
            browser: info.browser,
            os: info.os,
            location: lookup.info.location.clone(),
            ip: lookup.info.ip.clone(),
            login_time: now,
            last_active: now,
            current: true,
        };

        let mut sessions = self.store.list_sessions();
        for existing in &mut sessions {
            existing.current = false;
        }
        sessions.push(session.clone());
        if let Err(err) = self.store.replace_all(sessions) {
            tracing::warn!(error = %err, "failed to store new session");
            return None;
        }

        {
            let mut inner = lock(&self.inner);
            inner.phase = SessionPhase::Active {
                session_id: session.id.clone(),
            };
        }
        self.start_heartbeat();

        let entry = LoginHistoryEntry {
            timestamp: now,
            device: info.device,
            location: lookup.info.location,
            ip: lookup.info.ip,
            status: LoginStatus::Success,
        };
        if let Err(err) = self.store.append_login_history(entry) {
            tracing::warn!(error = %err, "failed to record login history");
        }

        tracing::info!(session_id = %session.id, device = %session.device, "session started");
        Some(session)
    }

    /// Adopts the stored current session, e.g. after a restart. Does not start
    /// the heartbeat.
    pub fn resume_current(&self) -> Option<Session> {
        let mut inner = lock(&self.inner);
        if let SessionPhase::Active { session_id } = &inner.phase {
            return self.store.find_by_id(session_id);
        }
        let session = self.store.list_sessions().into_iter().find(|s| s.current)?;
        inner.phase = SessionPhase::Active {
            session_id: session.id.clone(),
        };
        tracing::debug!(session_id = %session.id, "resumed stored session");
        Some(session)
    }

    /// (Re)starts the periodic refresh of the current session's `last_active`.
    /// A no-op without an active session.
    pub fn start_heartbeat(&self) {
        let mut inner = lock(&self.inner);
        let Some(session_id) = inner.phase.active_id().map(str::to_owned) else {
            return;
        };
        if let Some(previous) = inner.heartbeat.take() {
            previous.abort();
        }
        inner.interaction_armed = true;

        let store = self.store.clone();
        let shared = Arc::clone(&self.inner);
        let period = self.heartbeat_interval;
        inner.heartbeat = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                touch(&store, &session_id);
                lock(&shared).interaction_armed = true;
            }
        }));
    }

    fn stop_heartbeat(inner: &mut Inner) {
        if let Some(handle) = inner.heartbeat.take() {
            handle.abort();
        }
        inner.interaction_armed = false;
    }

    pub fn is_heartbeat_running(&self) -> bool {
        lock(&self.inner)
            .heartbeat
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Refreshes `last_active` on the first interaction of each heartbeat
    /// window. Returns whether the session was touched.
    pub fn record_interaction(&self, kind: Interaction) -> bool {
        let session_id = {
            let mut inner = lock(&self.inner);
            if !inner.interaction_armed {
                return false;
            }
            let Some(id) = inner.phase.active_id().map(str::to_owned) else {
                return false;
            };
            inner.interaction_armed = false;
            id
        };
        tracing::trace!(?kind, "interaction refreshes session");
        touch(&self.store, &session_id);
        true
    }

    /// Removes one session by id. Unknown ids are a successful no-op.
    pub fn terminate_session(&self, id: &str) -> Result<bool, StorageError> {
        let removed = self.store.delete(id)?;

        let mut inner = lock(&self.inner);
        if inner.phase.active_id() == Some(id) {
            Self::stop_heartbeat(&mut inner);
            inner.phase = SessionPhase::Terminated {
                session_id: id.to_string(),
            };
            tracing::info!(session_id = id, "current session terminated");
        } else if removed {
            tracing::info!(session_id = id, "session terminated");
        }
        Ok(removed)
    }

    /// Keeps only this manager's session, and only while it is still the
    /// stored current one. Without a current session the store is emptied.
    pub fn terminate_all_other_sessions(&self) -> Result<usize, StorageError> {
        let current_id = lock(&self.inner).phase.active_id().map(str::to_owned);

        let mut sessions = self.store.list_sessions();
        let before = sessions.len();
        sessions.retain(|s| s.current && current_id.as_deref() == Some(s.id.as_str()));
        let removed = before - sessions.len();
        if removed > 0 {
            self.store.replace_all(sessions)?;
        }
        if current_id.is_none() {
            tracing::debug!(removed, "no current session, cleared stored sessions");
        }
        tracing::info!(removed, "terminated other sessions");
        Ok(removed)
    }

    /// Ends the current session on logout. Login history is kept.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        let session_id = {
            let mut inner = lock(&self.inner);
            Self::stop_heartbeat(&mut inner);
            let id = inner.phase.active_id().map(str::to_owned);
            inner.phase = SessionPhase::NoSession;
            id
        };
        if let Some(id) = session_id {
            self.store.delete(&id)?;
            tracing::info!(session_id = %id, "session cleared");
        }
        Ok(())
    }

    /// Records a failed login attempt from this device.
    pub async fn add_failed_login(&self) -> Result<(), StorageError> {
        let (info, lookup) = self.probe().await;
        self.store.append_login_history(LoginHistoryEntry {
            timestamp: Utc::now(),
            device: info.device,
            location: lookup.info.location,
            ip: lookup.info.ip,
            status: LoginStatus::Failed,
        })?;
        tracing::info!("failed login recorded");
        Ok(())
    }

    /// The stored record of the session this manager created, if still present.
    pub fn current_session(&self) -> Option<Session> {
        let id = lock(&self.inner).phase.active_id().map(str::to_owned)?;
        self.store.find_by_id(&id)
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        Self::stop_heartbeat(&mut lock(&self.inner));
    }
}
