//! Mock objects and fake implementations for testing

use std::sync::Mutex;

use actix_web::cookie::Cookie;
use chrono::Utc;

use crate::models::SessionRecord;
use crate::session::transport::CookieTransport;
use crate::store::{SessionStore, StoreError};

/// Scripted [`CookieTransport`] for tests.
///
/// Presents a preset inbound token over a channel that is either encrypted
/// or plaintext, and captures every outbound cookie for inspection.
pub struct MockTransport {
    inbound_token: Option<String>,
    encrypted: bool,
    hostname: String,
    sent: Vec<Cookie<'static>>,
}

impl MockTransport {
    /// Transport over an encrypted channel, optionally presenting a session
    /// token.
    #[must_use]
    pub fn encrypted(inbound_token: Option<&str>) -> Self {
        Self {
            inbound_token: inbound_token.map(ToString::to_string),
            encrypted: true,
            hostname: "www.example.com".to_string(),
            sent: Vec::new(),
        }
    }

    /// Transport over a plaintext channel; cookie writes must be withheld.
    #[must_use]
    pub fn plaintext(inbound_token: Option<&str>) -> Self {
        Self {
            encrypted: false,
            ..Self::encrypted(inbound_token)
        }
    }

    /// Every cookie the session manager queued, in order.
    #[must_use]
    pub fn sent(&self) -> &[Cookie<'static>] {
        &self.sent
    }

    /// The queued cookie with the given name, if any.
    #[must_use]
    pub fn sent_cookie(&self, name: &str) -> Option<&Cookie<'static>> {
        self.sent.iter().find(|cookie| cookie.name() == name)
    }
}

impl CookieTransport for MockTransport {
    fn session_token(&self) -> Option<String> {
        self.inbound_token.clone()
    }

    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn canonical_hostname(&self) -> &str {
        &self.hostname
    }

    fn send(&mut self, cookie: Cookie<'static>) {
        self.sent.push(cookie);
    }
}

/// Single-row, call-recording [`SessionStore`] for tests.
///
/// Holds at most one session row, optionally seeded in an arbitrary
/// lifecycle state, and records the name of every operation invoked so tests
/// can assert which storage interactions happened - or that none did.
#[derive(Default)]
pub struct MockStore {
    row: Mutex<Option<SessionRecord>>,
    calls: Mutex<Vec<String>>,
}

impl MockStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with one existing row.
    #[must_use]
    pub fn with_row(record: SessionRecord) -> Self {
        Self {
            row: Mutex::new(Some(record)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Names of the operations invoked so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the call log is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, name: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(name.to_string());
        }
    }

    fn mutate_row(
        &self,
        company_id: i64,
        session_id: i64,
        apply: impl FnOnce(&mut SessionRecord),
    ) -> Result<SessionRecord, StoreError> {
        let mut row = self.row.lock().map_err(|_| StoreError::Unavailable {
            reason: "mock row is poisoned".to_string(),
        })?;

        match row.as_mut() {
            Some(record)
                if record.company_id == company_id && record.session_id == Some(session_id) =>
            {
                apply(record);
                record.last_request = Utc::now();
                Ok(record.clone())
            }
            _ => Err(StoreError::MissingRow {
                company_id,
                session_id,
            }),
        }
    }
}

impl SessionStore for MockStore {
    fn start_session(
        &self,
        company_id: i64,
        language_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError> {
        self.record_call("start_session");

        let record = SessionRecord {
            company_id,
            session_id: Some(1),
            session_token: session_token.to_string(),
            csrf_token: csrf_token.to_string(),
            user_id: None,
            is_anonymous: true,
            profile_id: 0,
            language_id,
            last_request: Utc::now(),
            payload: None,
        };
        if let Ok(mut row) = self.row.lock() {
            *row = Some(record.clone());
        }

        Ok(record)
    }

    fn fetch_session(
        &self,
        company_id: i64,
        session_token: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        self.record_call("fetch_session");

        let row = self.row.lock().map_err(|_| StoreError::Unavailable {
            reason: "mock row is poisoned".to_string(),
        })?;

        Ok(row
            .as_ref()
            .filter(|record| {
                record.company_id == company_id && record.session_token == session_token
            })
            .cloned())
    }

    fn restart_session(
        &self,
        company_id: i64,
        session_id: i64,
        language_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError> {
        self.record_call("restart_session");

        self.mutate_row(company_id, session_id, |record| {
            record.session_token = session_token.to_string();
            record.csrf_token = csrf_token.to_string();
            record.user_id = None;
            record.is_anonymous = true;
            record.profile_id = 0;
            record.language_id = language_id;
            record.payload = None;
        })
    }

    fn login_session(
        &self,
        company_id: i64,
        session_id: i64,
        user_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError> {
        self.record_call("login_session");

        self.mutate_row(company_id, session_id, |record| {
            record.session_token = session_token.to_string();
            record.csrf_token = csrf_token.to_string();
            record.user_id = Some(user_id);
            record.is_anonymous = false;
        })
    }

    fn logout_session(
        &self,
        company_id: i64,
        session_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError> {
        self.record_call("logout_session");

        self.mutate_row(company_id, session_id, |record| {
            record.session_token = session_token.to_string();
            record.csrf_token = csrf_token.to_string();
            record.user_id = None;
            record.is_anonymous = true;
            record.profile_id = 0;
        })
    }

    fn update_language(
        &self,
        company_id: i64,
        session_id: i64,
        language_id: i64,
    ) -> Result<(), StoreError> {
        self.record_call("update_language");

        self.mutate_row(company_id, session_id, |record| {
            record.language_id = language_id;
        })
        .map(|_| ())
    }

    fn update_payload(
        &self,
        company_id: i64,
        session_id: i64,
        payload: Option<&str>,
    ) -> Result<(), StoreError> {
        self.record_call("update_payload");

        self.mutate_row(company_id, session_id, |record| {
            record.payload = payload.map(ToString::to_string);
        })
        .map(|_| ())
    }
}
