//! Session persistence.
//!
//! The state machine in [`crate::session::SessionManager`] delegates every
//! write to a [`SessionStore`]. Each trait method is one transactional unit,
//! scoped by company: the store decides atomicity, the core never retries (a
//! retried mutation could rotate tokens twice) and always replaces its local
//! record with whatever the store returns.

pub mod memory;

use thiserror::Error;

use crate::models::SessionRecord;

pub use memory::MemoryStore;

/// Failures of the persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not complete the operation (connectivity,
    /// constraint violation, poisoned state).
    #[error("session store unavailable: {reason}")]
    Unavailable { reason: String },

    /// An operation addressed a session row that does not exist.
    #[error("no session row {session_id} for company {company_id}")]
    MissingRow { company_id: i64, session_id: i64 },
}

/// Storage backend for session rows.
///
/// All operations are synchronous and atomic; concurrent requests sharing a
/// session row are serialized at this layer, not by the session manager.
pub trait SessionStore: Send + Sync {
    /// Create a brand-new anonymous session row.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot create the row.
    fn start_session(
        &self,
        company_id: i64,
        language_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError>;

    /// Look up a session by the token the client presented.
    ///
    /// `Ok(None)` means the token is unknown for this company, either because
    /// the row was purged or because the token was never issued here. The
    /// store refreshes the row's last-request time but returns the
    /// pre-refresh value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot perform the lookup.
    fn fetch_session(
        &self,
        company_id: i64,
        session_token: &str,
    ) -> Result<Option<SessionRecord>, StoreError>;

    /// Reset an expired session in place: same row, fresh tokens, default
    /// language, anonymous identity, no payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or cannot be updated.
    fn restart_session(
        &self,
        company_id: i64,
        session_id: i64,
        language_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError>;

    /// Bind the session to an authenticated user, installing fresh tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or cannot be updated.
    fn login_session(
        &self,
        company_id: i64,
        session_id: i64,
        user_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError>;

    /// Clear the session's identity, installing fresh tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or cannot be updated.
    fn logout_session(
        &self,
        company_id: i64,
        session_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<SessionRecord, StoreError>;

    /// Persist a language change.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or cannot be updated.
    fn update_language(
        &self,
        company_id: i64,
        session_id: i64,
        language_id: i64,
    ) -> Result<(), StoreError>;

    /// Persist the serialized application payload, `None` to clear it.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or cannot be updated.
    fn update_payload(
        &self,
        company_id: i64,
        session_id: i64,
        payload: Option<&str>,
    ) -> Result<(), StoreError>;
}
