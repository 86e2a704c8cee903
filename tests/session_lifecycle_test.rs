// Integration tests for the session lifecycle state machine: create, resume,
// restart-after-expiry, login, logout and payload persistence.

use std::sync::Arc;

use serde_json::json;
use tessera_session::testing::{expired_settings, urandom_settings, MockStore, MockTransport, RecordBuilder};
use tessera_session::{FixedContext, MemoryStore, SessionManager, SessionStore};

fn start_with(
    store: Arc<dyn SessionStore>,
    settings: &tessera_session::SessionSettings,
    transport: MockTransport,
) -> SessionManager<MockTransport> {
    let context = FixedContext::new(7, 1);
    SessionManager::start(store, &context, settings, transport).expect("session should start")
}

#[test]
fn test_cookieless_starts_never_reissue_a_token() {
    let store = Arc::new(MemoryStore::new());
    let settings = urandom_settings();

    let first = start_with(store.clone(), &settings, MockTransport::encrypted(None));
    let second = start_with(store.clone(), &settings, MockTransport::encrypted(None));

    assert_ne!(first.session_token(), second.session_token());
    assert_ne!(first.csrf_token(), second.csrf_token());
    assert_ne!(first.session_id(), second.session_id());
}

#[test]
fn test_unknown_token_silently_reissues_identity() {
    let store = Arc::new(MemoryStore::new());
    let settings = urandom_settings();
    let presented = "deadbeef".repeat(8);

    // A token storage has never seen for company 7: the client gets a fresh
    // anonymous session, not an error.
    let session = start_with(
        store.clone(),
        &settings,
        MockTransport::encrypted(Some(&presented)),
    );

    assert!(session.is_anonymous());
    assert_ne!(session.session_token(), presented);
    assert!(session.session_id().is_some());
}

#[test]
fn test_resume_preserves_identity_and_tokens() {
    let store = Arc::new(MemoryStore::new());
    let settings = urandom_settings();

    let mut first = start_with(store.clone(), &settings, MockTransport::encrypted(None));
    first.login(42).expect("login should succeed");
    let token = first.session_token().to_string();
    let csrf = first.csrf_token().to_string();

    let resumed = start_with(
        store.clone(),
        &settings,
        MockTransport::encrypted(Some(&token)),
    );

    assert_eq!(resumed.session_id(), first.session_id());
    assert_eq!(resumed.session_token(), token);
    assert_eq!(resumed.csrf_token(), csrf);
    assert_eq!(resumed.user_id(), Some(42));
    assert!(!resumed.is_anonymous());
}

#[test]
fn test_login_rotates_tokens_and_binds_user() {
    let store = Arc::new(MemoryStore::new());
    let settings = urandom_settings();

    let mut session = start_with(store.clone(), &settings, MockTransport::encrypted(None));
    let token_before = session.session_token().to_string();
    let csrf_before = session.csrf_token().to_string();

    session.login(42).expect("login should succeed");

    assert!(!session.is_anonymous());
    assert_eq!(session.user_id(), Some(42));
    assert_ne!(session.session_token(), token_before);
    assert_ne!(session.csrf_token(), csrf_before);
}

#[test]
fn test_logout_discards_the_authenticated_principal() {
    let store = Arc::new(MemoryStore::new());
    let settings = urandom_settings();

    let mut session = start_with(store.clone(), &settings, MockTransport::encrypted(None));
    session.login(42).expect("login should succeed");
    let token_before = session.session_token().to_string();
    let csrf_before = session.csrf_token().to_string();

    session.logout().expect("logout should succeed");

    assert!(session.is_anonymous());
    assert!(session.user_id().is_none());
    assert_ne!(session.session_token(), token_before);
    assert_ne!(session.csrf_token(), csrf_before);

    // The old token no longer resumes the session.
    let from_stale_cookie = start_with(
        store.clone(),
        &settings,
        MockTransport::encrypted(Some(&token_before)),
    );
    assert_ne!(from_stale_cookie.session_id(), session.session_id());
}

#[test]
fn test_payload_round_trips_across_requests() {
    let store = Arc::new(MemoryStore::new());
    let settings = urandom_settings();

    let mut session = start_with(store.clone(), &settings, MockTransport::encrypted(None));
    session.insert("a", json!(1));
    session.insert("b", json!("x"));
    session.save().expect("save should succeed");
    let token = session.session_token().to_string();

    let resumed = start_with(
        store.clone(),
        &settings,
        MockTransport::encrypted(Some(&token)),
    );

    assert_eq!(resumed.get("a"), Some(&json!(1)));
    assert_eq!(resumed.get("b"), Some(&json!("x")));
    assert_eq!(resumed.payload().len(), 2);
}

#[test]
fn test_cleared_payload_saves_as_empty() {
    let store = Arc::new(MemoryStore::new());
    let settings = urandom_settings();

    let mut session = start_with(store.clone(), &settings, MockTransport::encrypted(None));
    session.insert("a", json!(1));
    session.save().expect("save should succeed");

    session.clear();
    session.save().expect("save should succeed");
    let token = session.session_token().to_string();

    let resumed = start_with(
        store.clone(),
        &settings,
        MockTransport::encrypted(Some(&token)),
    );
    assert!(resumed.payload().is_empty());
}

#[test]
fn test_expired_session_restarts_in_place() {
    let store = Arc::new(MemoryStore::new());

    let mut session = start_with(
        store.clone(),
        &urandom_settings(),
        MockTransport::encrypted(None),
    );
    session.login(42).expect("login should succeed");
    session.insert("cart", json!(3));
    session.save().expect("save should succeed");
    let session_id = session.session_id();
    let token = session.session_token().to_string();

    // With a zero-second timeout the session is already idle past the
    // boundary when it is fetched again.
    let restarted = start_with(
        store.clone(),
        &expired_settings(),
        MockTransport::encrypted(Some(&token)),
    );

    // Same row, fresh epoch: identity, payload and tokens are gone.
    assert_eq!(restarted.session_id(), session_id);
    assert!(restarted.is_anonymous());
    assert!(restarted.user_id().is_none());
    assert_ne!(restarted.session_token(), token);
    assert!(restarted.payload().is_empty());
}

#[test]
fn test_expiry_boundary_is_inclusive() {
    // A session idle for exactly the timeout is expired, not resumed.
    let record = RecordBuilder::new(7, 11)
        .authenticated(42)
        .idle_for(1200)
        .build();
    let token = record.session_token.clone();
    let store = Arc::new(MockStore::with_row(record));

    let session = start_with(
        store.clone(),
        &urandom_settings(),
        MockTransport::encrypted(Some(&token)),
    );

    assert_eq!(
        store.calls(),
        vec!["fetch_session".to_string(), "restart_session".to_string()]
    );
    assert_eq!(session.session_id(), Some(11));
    assert!(session.is_anonymous());
    assert_ne!(session.session_token(), token);
}

#[test]
fn test_fresh_session_is_resumed_without_storage_writes() {
    let record = RecordBuilder::new(7, 11).authenticated(42).build();
    let token = record.session_token.clone();
    let store = Arc::new(MockStore::with_row(record));

    let session = start_with(
        store.clone(),
        &urandom_settings(),
        MockTransport::encrypted(Some(&token)),
    );

    // A live session is fetched and nothing else.
    assert_eq!(store.calls(), vec!["fetch_session".to_string()]);
    assert_eq!(session.user_id(), Some(42));
    assert_eq!(session.session_token(), token);
}

#[test]
fn test_language_change_persists_without_rotation() {
    let store = Arc::new(MemoryStore::new());
    let settings = urandom_settings();

    let mut session = start_with(store.clone(), &settings, MockTransport::encrypted(None));
    let token = session.session_token().to_string();

    session.set_language(2).expect("language change should succeed");
    assert_eq!(session.language_id(), 2);
    assert_eq!(session.session_token(), token);

    let resumed = start_with(
        store.clone(),
        &settings,
        MockTransport::encrypted(Some(&token)),
    );
    assert_eq!(resumed.language_id(), 2);
}

#[test]
fn test_fake_row_from_storage_never_interacts_again() {
    // Storage may hand out rows without a session ID; every mutating
    // operation on such a session is a no-op that leaves storage untouched.
    let record = RecordBuilder::new(7, 11).build();
    let mut fake = record;
    fake.session_id = None;
    let token = fake.session_token.clone();
    let store = Arc::new(MockStore::with_row(fake));

    let mut session = start_with(
        store.clone(),
        &urandom_settings(),
        MockTransport::encrypted(Some(&token)),
    );

    session.login(42).expect("login is a no-op");
    session.logout().expect("logout is a no-op");
    session.set_language(2).expect("language change is a no-op");
    session.insert("k", json!(1));
    session.save().expect("save is a no-op");

    assert_eq!(store.calls(), vec!["fetch_session".to_string()]);
    assert!(session.is_anonymous());
    assert!(session.user_id().is_none());
    assert_eq!(session.language_id(), 1);
    assert_eq!(session.session_token(), token);
}

#[test]
fn test_company_scoping_isolates_tenants() {
    let store = Arc::new(MemoryStore::new());
    let settings = urandom_settings();

    let session = start_with(store.clone(), &settings, MockTransport::encrypted(None));
    let token = session.session_token().to_string();

    // The same token presented under another company resolves to a brand-new
    // session for that company.
    let other_context = FixedContext::new(8, 1);
    let other = SessionManager::start(
        store.clone() as Arc<dyn SessionStore>,
        &other_context,
        &settings,
        MockTransport::encrypted(Some(&token)),
    )
    .expect("session should start");

    assert_eq!(other.company_id(), 8);
    assert_ne!(other.session_token(), token);
}
