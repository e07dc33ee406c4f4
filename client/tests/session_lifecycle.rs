use chrono::Utc;
use wardwatch_client::{
    models::{DeviceClass, LoginHistoryEntry, LoginStatus},
    repositories::{ActivityLog, RecordOutcome, SessionStore},
    services::SessionPhase,
    utils::time::{time_ago_at, time_ago_value},
};

#[path = "support/mod.rs"]
mod support;

use support::{memory_backend, offline_manager, CHROME_WINDOWS, SAFARI_IPHONE};

#[tokio::test]
async fn login_second_login_terminate_and_clear() {
    let backend = memory_backend();
    let desktop = offline_manager(backend.clone(), CHROME_WINDOWS);
    let phone = offline_manager(backend.clone(), SAFARI_IPHONE);
    let store = SessionStore::new(backend);

    let first = desktop.initialize_session().await.expect("first session");
    assert_eq!(store.list_sessions().len(), 1);
    let history = store.list_login_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, LoginStatus::Success);

    let second = phone.initialize_session().await.expect("second session");
    assert_eq!(second.device_type, DeviceClass::Mobile);
    let sessions = store.list_sessions();
    assert_eq!(sessions.len(), 2);
    let current: Vec<_> = sessions.iter().filter(|s| s.current).collect();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].id, second.id);

    assert!(phone.terminate_session(&first.id).unwrap());
    let sessions = store.list_sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, second.id);
    assert!(sessions[0].current);

    let history_before_clear = store.list_login_history();
    phone.clear_session().unwrap();
    assert!(store.list_sessions().is_empty());
    assert_eq!(store.list_login_history(), history_before_clear);
    assert_eq!(phone.phase(), SessionPhase::NoSession);
}

#[tokio::test]
async fn failed_login_without_session_leaves_sessions_alone() {
    let backend = memory_backend();
    let store = SessionStore::new(backend.clone());
    let existing = offline_manager(backend.clone(), CHROME_WINDOWS)
        .initialize_session()
        .await
        .unwrap();
    let before = store.list_sessions();

    let manager = offline_manager(backend, SAFARI_IPHONE);
    manager.add_failed_login().await.unwrap();

    assert_eq!(store.list_sessions(), before);
    assert_eq!(before[0].id, existing.id);
    let history = store.list_login_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, LoginStatus::Failed);
    assert_eq!(history[0].device, "Mobile - Safari");
}

#[tokio::test]
async fn terminate_others_leaves_exactly_the_current_session() {
    let backend = memory_backend();
    let store = SessionStore::new(backend.clone());
    for _ in 0..3 {
        offline_manager(backend.clone(), SAFARI_IPHONE)
            .initialize_session()
            .await
            .unwrap();
    }
    let manager = offline_manager(backend, CHROME_WINDOWS);
    let current = manager.initialize_session().await.unwrap();

    assert_eq!(manager.terminate_all_other_sessions().unwrap(), 3);
    assert_eq!(store.list_sessions(), vec![current]);
}

#[test]
fn login_history_evicts_oldest_and_keeps_order() {
    let store = SessionStore::new(memory_backend());
    let base = Utc::now();
    for n in 0..51 {
        store
            .append_login_history(LoginHistoryEntry {
                timestamp: base + chrono::Duration::seconds(n),
                device: format!("device-{n}"),
                location: "Unknown Location".into(),
                ip: "Unknown".into(),
                status: LoginStatus::Success,
            })
            .unwrap();
    }

    let history = store.list_login_history();
    assert_eq!(history.len(), 50);
    let expected: Vec<_> = (1..51).rev().map(|n| format!("device-{n}")).collect();
    let devices: Vec<_> = history.into_iter().map(|e| e.device).collect();
    assert_eq!(devices, expected);
}

#[test]
fn activity_log_caps_and_collapses_duplicates() {
    let log = ActivityLog::new(memory_backend());
    let now = 1_700_000_000_000;

    assert!(matches!(
        log.record_at("Viewed bed board", "🛏️", now).unwrap(),
        RecordOutcome::Recorded(_)
    ));
    assert_eq!(
        log.record_at("Viewed bed board", "🛏️", now + 3_000).unwrap(),
        RecordOutcome::Duplicate
    );
    assert_eq!(log.query().len(), 1);

    log.record_at("Viewed bed board", "🛏️", now + 6_000).unwrap();
    assert_eq!(log.query().len(), 2);

    for n in 0..30 {
        log.record_at(&format!("Updated patient {n}"), "✏️", now + 10_000 + n)
            .unwrap();
    }
    assert_eq!(log.query().len(), 20);
}

#[test]
fn time_ago_wording() {
    let now = 1_700_000_000_000;
    assert_eq!(time_ago_at(now - 45_000, now), "Just now");
    assert_eq!(time_ago_at(now - 5 * 60_000, now), "5 minutes ago");
    assert_eq!(time_ago_at(-5, now), "Unknown time");
    assert_eq!(
        time_ago_value(&serde_json::json!("yesterday"), now),
        "Unknown time"
    );
}
