#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use wardwatch_client::{
    api::{ApiClient, CredentialStore},
    config::Config,
    repositories::{ActivityLog, SessionStore},
    services::{AuthService, SessionManager, StaticLocationProbe},
    storage::{ClientStorage, KeyValueStore, MemoryStore},
};

pub const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";

pub fn memory_backend() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

pub fn offline_manager(backend: Arc<dyn KeyValueStore>, user_agent: &str) -> SessionManager {
    SessionManager::new(
        SessionStore::new(backend),
        Arc::new(StaticLocationProbe::unknown(chrono_tz::UTC)),
        user_agent,
    )
}

pub fn config_with_api(api_base_url: impl Into<String>) -> Config {
    Config {
        api_base_url: api_base_url.into(),
        ..Config::default()
    }
}

pub struct AuthHarness {
    pub storage: ClientStorage,
    pub credentials: CredentialStore,
    pub auth: AuthService,
}

pub fn auth_harness(api_base_url: impl Into<String>) -> AuthHarness {
    let storage = ClientStorage::in_memory();
    let credentials = CredentialStore::new(storage.clone());
    let api = ApiClient::new(&config_with_api(api_base_url), credentials.clone())
        .expect("build api client");
    let sessions = Arc::new(offline_manager(storage.persistent(), CHROME_WINDOWS));
    let auth = AuthService::new(
        api,
        credentials.clone(),
        sessions,
        ActivityLog::new(storage.persistent()),
    );
    AuthHarness {
        storage,
        credentials,
        auth,
    }
}

pub fn user_json(id: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": "Dr. Ines Costa",
        "email": "ines@example.org",
        "role": "doctor"
    })
}
