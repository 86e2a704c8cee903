use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the session table, as the storage backend returns it.
///
/// A record with `session_id == None` is a non-persistent (fake) session:
/// it has no backing row and every mutating operation on it is a no-op.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SessionRecord {
    /// Company the session belongs to. Scopes every storage operation and is
    /// never reassigned after the session starts.
    pub company_id: i64,

    /// Backing row ID, `None` for non-persistent sessions.
    pub session_id: Option<i64>,

    /// Token identifying the session to the client via cookie.
    /// Rotated on login, logout and restart.
    pub session_token: String,

    /// Double-submit token for CSRF protection, rotated alongside
    /// `session_token`.
    pub csrf_token: String,

    /// Authenticated principal. `None` while the session is anonymous, and
    /// again after logout.
    pub user_id: Option<i64>,

    /// True until a successful login.
    pub is_anonymous: bool,

    /// Profile of the session's user.
    pub profile_id: i64,

    /// Preferred language of the session.
    pub language_id: i64,

    /// Time of the previous request on this session. The store refreshes the
    /// stored value on fetch but returns the pre-refresh value, so expiry is
    /// judged against the previous request.
    pub last_request: DateTime<Utc>,

    /// Serialized application state, `None` when the session holds none.
    pub payload: Option<String>,
}

impl SessionRecord {
    /// Create a fake session record with no backing row and no tokens.
    #[must_use]
    pub fn non_persistent(company_id: i64, language_id: i64) -> Self {
        Self {
            company_id,
            session_id: None,
            session_token: String::new(),
            csrf_token: String::new(),
            user_id: None,
            is_anonymous: true,
            profile_id: 0,
            language_id,
            last_request: Utc::now(),
            payload: None,
        }
    }

    /// Deserialize the opaque payload into a key/value mapping.
    ///
    /// An absent payload hydrates to an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored blob is not valid JSON.
    pub fn hydrate_payload(&self) -> Result<HashMap<String, serde_json::Value>, serde_json::Error> {
        match &self.payload {
            Some(raw) => serde_json::from_str(raw),
            None => Ok(HashMap::new()),
        }
    }

    /// Serialize a payload mapping back to its stored form.
    ///
    /// An empty mapping serializes to `None`, the defined "no payload"
    /// sentinel.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn serialize_payload(
        payload: &HashMap<String, serde_json::Value>,
    ) -> Result<Option<String>, serde_json::Error> {
        if payload.is_empty() {
            Ok(None)
        } else {
            serde_json::to_string(payload).map(Some)
        }
    }
}
