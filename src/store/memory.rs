//! In-memory reference implementation of [`SessionStore`].
//!
//! Backs the state machine without an external database. Production
//! deployments implement [`SessionStore`] against their own schema; this
//! store keeps rows in a mutex-guarded map with the same observable
//! semantics.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::models::SessionRecord;
use crate::store::{SessionStore, StoreError};

#[derive(Default)]
struct Rows {
    next_id: i64,
    by_id: HashMap<(i64, i64), SessionRecord>,
}

/// Mutex-guarded in-memory session store.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Rows>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Rows>, StoreError> {
        self.rows.lock().map_err(|_| StoreError::Unavailable {
            reason: "session row map is poisoned".to_string(),
        })
    }
}

impl SessionStore for MemoryStore {
    fn start_session(
        &self,
        company_id: i64,
        language_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError> {
        let mut rows = self.lock()?;
        rows.next_id += 1;
        let session_id = rows.next_id;

        let record = SessionRecord {
            company_id,
            session_id: Some(session_id),
            session_token: session_token.to_string(),
            csrf_token: csrf_token.to_string(),
            user_id: None,
            is_anonymous: true,
            profile_id: 0,
            language_id,
            last_request: Utc::now(),
            payload: None,
        };
        rows.by_id.insert((company_id, session_id), record.clone());

        Ok(record)
    }

    fn fetch_session(
        &self,
        company_id: i64,
        session_token: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let mut rows = self.lock()?;
        let found = rows
            .by_id
            .iter()
            .find(|((cmp_id, _), row)| *cmp_id == company_id && row.session_token == session_token)
            .map(|(key, _)| *key);

        // Hand back the row as it was, then mark the activity. Expiry is
        // always judged against the previous request.
        if let Some(row) = found.and_then(|key| rows.by_id.get_mut(&key)) {
            let fetched = row.clone();
            row.last_request = Utc::now();
            return Ok(Some(fetched));
        }

        Ok(None)
    }

    fn restart_session(
        &self,
        company_id: i64,
        session_id: i64,
        language_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError> {
        let mut rows = self.lock()?;
        let row = rows.by_id.get_mut(&(company_id, session_id)).ok_or(
            StoreError::MissingRow {
                company_id,
                session_id,
            },
        )?;

        row.session_token = session_token.to_string();
        row.csrf_token = csrf_token.to_string();
        row.user_id = None;
        row.is_anonymous = true;
        row.profile_id = 0;
        row.language_id = language_id;
        row.last_request = Utc::now();
        row.payload = None;

        Ok(row.clone())
    }

    fn login_session(
        &self,
        company_id: i64,
        session_id: i64,
        user_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError> {
        let mut rows = self.lock()?;
        let row = rows.by_id.get_mut(&(company_id, session_id)).ok_or(
            StoreError::MissingRow {
                company_id,
                session_id,
            },
        )?;

        row.session_token = session_token.to_string();
        row.csrf_token = csrf_token.to_string();
        row.user_id = Some(user_id);
        row.is_anonymous = false;
        row.last_request = Utc::now();

        Ok(row.clone())
    }

    fn logout_session(
        &self,
        company_id: i64,
        session_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError> {
        let mut rows = self.lock()?;
        let row = rows.by_id.get_mut(&(company_id, session_id)).ok_or(
            StoreError::MissingRow {
                company_id,
                session_id,
            },
        )?;

        row.session_token = session_token.to_string();
        row.csrf_token = csrf_token.to_string();
        row.user_id = None;
        row.is_anonymous = true;
        row.profile_id = 0;
        row.last_request = Utc::now();

        Ok(row.clone())
    }

    fn update_language(
        &self,
        company_id: i64,
        session_id: i64,
        language_id: i64,
    ) -> Result<(), StoreError> {
        let mut rows = self.lock()?;
        let row = rows.by_id.get_mut(&(company_id, session_id)).ok_or(
            StoreError::MissingRow {
                company_id,
                session_id,
            },
        )?;
        row.language_id = language_id;

        Ok(())
    }

    fn update_payload(
        &self,
        company_id: i64,
        session_id: i64,
        payload: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut rows = self.lock()?;
        let row = rows.by_id.get_mut(&(company_id, session_id)).ok_or(
            StoreError::MissingRow {
                company_id,
                session_id,
            },
        )?;
        row.payload = payload.map(ToString::to_string);

        Ok(())
    }
}
