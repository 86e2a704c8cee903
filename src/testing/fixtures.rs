//! Test fixtures and builders

use chrono::{DateTime, Duration, Utc};

use crate::models::SessionRecord;
use crate::settings::SessionSettings;

/// Settings reading real entropy with the default timeout.
#[must_use]
pub fn urandom_settings() -> SessionSettings {
    SessionSettings::default()
}

/// Settings with a timeout of zero seconds: every fetched session is
/// already expired, including one fetched in the same instant.
#[must_use]
pub fn expired_settings() -> SessionSettings {
    SessionSettings {
        timeout_seconds: 0,
        ..SessionSettings::default()
    }
}

/// Builder for session records in arbitrary lifecycle states.
pub struct RecordBuilder {
    record: SessionRecord,
}

impl RecordBuilder {
    #[must_use]
    pub fn new(company_id: i64, session_id: i64) -> Self {
        Self {
            record: SessionRecord {
                company_id,
                session_id: Some(session_id),
                session_token: format!("session-token-{session_id}"),
                csrf_token: format!("csrf-token-{session_id}"),
                user_id: None,
                is_anonymous: true,
                profile_id: 0,
                language_id: 1,
                last_request: Utc::now(),
                payload: None,
            },
        }
    }

    #[must_use]
    pub fn authenticated(mut self, user_id: i64) -> Self {
        self.record.user_id = Some(user_id);
        self.record.is_anonymous = false;
        self
    }

    #[must_use]
    pub fn last_request(mut self, at: DateTime<Utc>) -> Self {
        self.record.last_request = at;
        self
    }

    /// Backdate the record so it is idle for the given number of seconds.
    #[must_use]
    pub fn idle_for(mut self, seconds: i64) -> Self {
        self.record.last_request = Utc::now() - Duration::seconds(seconds);
        self
    }

    #[must_use]
    pub fn payload(mut self, raw: &str) -> Self {
        self.record.payload = Some(raw.to_string());
        self
    }

    #[must_use]
    pub fn build(self) -> SessionRecord {
        self.record
    }
}
