use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    api::{ApiClient, ApiError, CredentialStore, LoginRequest, UserResponse},
    models::ActivityEvent,
    repositories::ActivityLog,
    services::session_manager::SessionManager,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<UserResponse>,
    pub is_authenticated: bool,
}

impl AuthState {
    fn signed_in(user: UserResponse) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
        }
    }
}

/// Owns the signed-in lifetime: credentials, the tracked session and the
/// login/logout entries in the activity feed.
pub struct AuthService {
    api: ApiClient,
    credentials: CredentialStore,
    sessions: Arc<SessionManager>,
    activity: ActivityLog,
    state: watch::Sender<AuthState>,
}

impl AuthService {
    pub fn new(
        api: ApiClient,
        credentials: CredentialStore,
        sessions: Arc<SessionManager>,
        activity: ActivityLog,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            api,
            credentials,
            sessions,
            activity,
            state,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Re-validates stored credentials with the backend. Anything short of a
    /// successful verification clears them.
    pub async fn restore(&self) -> AuthState {
        let (Some(user), Some(_)) = (self.credentials.user(), self.credentials.token()) else {
            return self.state();
        };

        match self.api.verify().await {
            Ok(response) if response.success => {
                self.sessions.resume_current();
                let state = AuthState::signed_in(user);
                self.state.send_replace(state.clone());
                tracing::debug!("restored stored credentials");
                state
            }
            Ok(_) => {
                tracing::info!("stored token rejected, clearing credentials");
                self.reset()
            }
            Err(err) => {
                tracing::warn!(error = %err, "token verification failed");
                self.reset()
            }
        }
    }

    fn reset(&self) -> AuthState {
        self.credentials.clear();
        self.state.send_replace(AuthState::default());
        AuthState::default()
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<UserResponse, ApiError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::validation("Email and password are required"));
        }

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let outcome = match self.api.login(&request).await {
            Ok(response) => match (response.success, response.token, response.user) {
                (true, Some(token), Some(user)) => Ok((token, user)),
                (_, _, _) => Err(ApiError::request_failed(
                    response.message.unwrap_or_else(|| "Login failed".to_string()),
                )),
            },
            Err(err) => Err(err),
        };

        let (token, user) = match outcome {
            Ok(signed_in) => signed_in,
            Err(err) => {
                if let Err(storage_err) = self.sessions.add_failed_login().await {
                    tracing::warn!(error = %storage_err, "failed to record failed login");
                }
                return Err(err);
            }
        };

        self.credentials
            .save(&token, &user, remember_me)
            .map_err(|e| ApiError::unknown(format!("Failed to store credentials: {}", e)))?;
        self.state.send_replace(AuthState::signed_in(user.clone()));

        if self.sessions.initialize_session().await.is_none() {
            tracing::warn!("login succeeded without a tracked session");
        }
        if let Err(err) = self.activity.log_event(&ActivityEvent::Login) {
            tracing::warn!(error = %err, "failed to log login activity");
        }
        tracing::info!(user = %user.email, remember_me, "logged in");
        Ok(user)
    }

    pub fn logout(&self) {
        if let Err(err) = self.sessions.clear_session() {
            tracing::warn!(error = %err, "failed to clear tracked session");
        }
        if let Err(err) = self.activity.log_event(&ActivityEvent::Logout) {
            tracing::warn!(error = %err, "failed to log logout activity");
        }
        self.reset();
        tracing::info!("logged out");
    }
}
