//! Session Manager - resume-or-create lifecycle and token rotation
//!
//! One `SessionManager` is exclusive to one in-flight request. It resolves
//! the session record once at construction (create, resume, or
//! restart-after-expiry), answers field queries from that record, and pushes
//! every identity-changing mutation through the [`SessionStore`].
//!
//! Security protocol: the session token and the CSRF token are minted fresh
//! at every identity epoch - new session, restart, login, logout - so a
//! token leaked in one epoch is worthless in the next. Resuming a live
//! session rotates nothing.

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError};
use chrono::{Duration, Utc};
use log::{debug, info};
use serde_json::Value;
use thiserror::Error;

use crate::context::ContextResolver;
use crate::models::SessionRecord;
use crate::session::cookie::CookieFactory;
use crate::session::transport::CookieTransport;
use crate::settings::SessionSettings;
use crate::store::{SessionStore, StoreError};
use crate::utils::crypto::TokenMinter;

// =============================================================================
// Types and Error Handling
// =============================================================================

/// Failures the session layer can surface to the caller.
///
/// An unknown or expired inbound token is deliberately absent here: it
/// degrades to a fresh anonymous session and the caller never sees it.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The entropy source could not be opened or read. Fatal for the
    /// operation that needed a token; weaker randomness is never
    /// substituted.
    #[error("entropy source unavailable: {0}")]
    Entropy(#[from] std::io::Error),

    /// A storage operation failed. Propagated without retry; a retried
    /// mutation could rotate tokens twice.
    #[error("session store failure: {0}")]
    Store(#[from] StoreError),

    /// The stored payload blob could not be decoded.
    #[error("malformed session payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl ResponseError for SessionError {
    fn error_response(&self) -> HttpResponse {
        // Session infrastructure failures are never the client's fault.
        HttpResponse::InternalServerError().finish()
    }
}

// Store access plus the minter that feeds it fresh tokens. Absent on
// non-persistent sessions.
struct Backend {
    store: Arc<dyn SessionStore>,
    minter: TokenMinter,
}

// =============================================================================
// Session Manager
// =============================================================================

/// Per-request session state machine.
pub struct SessionManager<T: CookieTransport> {
    backend: Option<Backend>,
    transport: T,
    record: SessionRecord,
    payload: HashMap<String, Value>,
}

impl<T: CookieTransport> SessionManager<T> {
    /// Create or resume the session for the current request.
    ///
    /// Resolution order:
    /// 1. No inbound cookie: start a new session.
    /// 2. Inbound token unknown to the store (purged, or never issued here):
    ///    start a new session. The client sees a fresh anonymous identity,
    ///    never an error.
    /// 3. Inbound token found but idle past the timeout (boundary
    ///    inclusive): restart the row in place with fresh tokens, default
    ///    language, anonymous identity and no payload.
    /// 4. Otherwise: resume as-is, without token rotation.
    ///
    /// # Errors
    ///
    /// Returns an error if the entropy source fails, a storage call fails,
    /// or the stored payload cannot be decoded.
    pub fn start(
        store: Arc<dyn SessionStore>,
        context: &dyn ContextResolver,
        settings: &SessionSettings,
        transport: T,
    ) -> Result<Self, SessionError> {
        let minter = TokenMinter::new(settings);
        let company_id = context.company_id();
        let language_id = context.default_language_id();

        let record = match transport.session_token() {
            None => {
                debug!("no session cookie presented, starting session for company {company_id}");
                Self::fresh_session(store.as_ref(), &minter, company_id, language_id)?
            }
            Some(token) => match store.fetch_session(company_id, &token)? {
                None => {
                    debug!(
                        "presented token unknown for company {company_id}, starting new session"
                    );
                    Self::fresh_session(store.as_ref(), &minter, company_id, language_id)?
                }
                Some(record) => {
                    let expired =
                        record.last_request + Duration::seconds(settings.timeout_seconds)
                            <= Utc::now();
                    match (expired, record.session_id) {
                        (true, Some(session_id)) => {
                            debug!(
                                "session {session_id} for company {company_id} idle past timeout, restarting"
                            );
                            let session_token = minter.mint()?;
                            let csrf_token = minter.mint()?;
                            store.restart_session(
                                company_id,
                                session_id,
                                language_id,
                                &session_token,
                                &csrf_token,
                            )?
                        }
                        _ => {
                            debug!("resuming session for company {company_id}");
                            record
                        }
                    }
                }
            },
        };

        let payload = record.hydrate_payload()?;
        let mut manager = Self {
            backend: Some(Backend { store, minter }),
            transport,
            record,
            payload,
        };
        manager.set_cookies();

        Ok(manager)
    }

    /// Create a fake session that is never persisted.
    ///
    /// Supports contexts without a request/response cycle - batch jobs
    /// borrowing session-shaped APIs. The session carries no tokens, never
    /// touches storage and never writes cookies; every mutating operation is
    /// a defined no-op.
    #[must_use]
    pub fn non_persistent(company_id: i64, language_id: i64, transport: T) -> Self {
        Self {
            backend: None,
            transport,
            record: SessionRecord::non_persistent(company_id, language_id),
            payload: HashMap::new(),
        }
    }

    fn fresh_session(
        store: &dyn SessionStore,
        minter: &TokenMinter,
        company_id: i64,
        language_id: i64,
    ) -> Result<SessionRecord, SessionError> {
        let session_token = minter.mint()?;
        let csrf_token = minter.mint()?;

        Ok(store.start_session(company_id, language_id, &session_token, &csrf_token)?)
    }
}

// =============================================================================
// Identity Transitions
// =============================================================================

impl<T: CookieTransport> SessionManager<T> {
    /// Bind the session to a user who has successfully authenticated.
    ///
    /// Mints fresh session and CSRF tokens, persists the identity change and
    /// adopts the record storage returns. No-op on a non-persistent session.
    ///
    /// # Errors
    ///
    /// Returns an error if the entropy source or the storage call fails; the
    /// session is left as it was before the call.
    pub fn login(&mut self, user_id: i64) -> Result<(), SessionError> {
        let (Some(backend), Some(session_id)) = (&self.backend, self.record.session_id) else {
            return Ok(());
        };

        let session_token = backend.minter.mint()?;
        let csrf_token = backend.minter.mint()?;
        let record = backend.store.login_session(
            self.record.company_id,
            session_id,
            user_id,
            &session_token,
            &csrf_token,
        )?;
        info!(
            "user {user_id} logged in on session {session_id} of company {}",
            self.record.company_id
        );

        self.adopt(record)?;
        self.set_cookies();

        Ok(())
    }

    /// Terminate the authenticated identity of the current session.
    ///
    /// Mints fresh tokens and clears the principal; the row survives as an
    /// anonymous session. No-op on a non-persistent session.
    ///
    /// # Errors
    ///
    /// Returns an error if the entropy source or the storage call fails; the
    /// session is left as it was before the call.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        let (Some(backend), Some(session_id)) = (&self.backend, self.record.session_id) else {
            return Ok(());
        };

        let session_token = backend.minter.mint()?;
        let csrf_token = backend.minter.mint()?;
        let record = backend.store.logout_session(
            self.record.company_id,
            session_id,
            &session_token,
            &csrf_token,
        )?;
        info!(
            "session {session_id} of company {} logged out",
            self.record.company_id
        );

        self.adopt(record)?;
        self.set_cookies();

        Ok(())
    }

    /// Change the language of the current session.
    ///
    /// Not a security-sensitive transition: no token rotation. No-op on a
    /// non-persistent session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage call fails; the in-memory language is
    /// then left unchanged.
    pub fn set_language(&mut self, language_id: i64) -> Result<(), SessionError> {
        let (Some(backend), Some(session_id)) = (&self.backend, self.record.session_id) else {
            return Ok(());
        };

        backend
            .store
            .update_language(self.record.company_id, session_id, language_id)?;
        self.record.language_id = language_id;

        Ok(())
    }

    /// Persist the application payload. Intended to run once, at the end of
    /// the request. No-op on a non-persistent session.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage call fails.
    pub fn save(&mut self) -> Result<(), SessionError> {
        let (Some(backend), Some(session_id)) = (&self.backend, self.record.session_id) else {
            return Ok(());
        };

        let serialized = SessionRecord::serialize_payload(&self.payload)?;
        backend
            .store
            .update_payload(self.record.company_id, session_id, serialized.as_deref())?;
        self.record.payload = serialized;

        Ok(())
    }

    // The store's answer is authoritative: replace the local record
    // wholesale, never merge.
    fn adopt(&mut self, record: SessionRecord) -> Result<(), SessionError> {
        self.payload = record.hydrate_payload()?;
        self.record = record;

        Ok(())
    }

    fn set_cookies(&mut self) {
        if !self.transport.is_encrypted() {
            // Bearer tokens never travel over a plaintext channel.
            debug!("channel is not encrypted, withholding session cookies");
            return;
        }

        let factory = CookieFactory::new(self.transport.canonical_hostname());
        let session_cookie = factory.session_cookie(&self.record.session_token);
        let csrf_cookie = factory.csrf_cookie(&self.record.csrf_token);

        self.transport.send(session_cookie);
        self.transport.send(csrf_cookie);
    }
}

// =============================================================================
// Query Surface
// =============================================================================

impl<T: CookieTransport> SessionManager<T> {
    /// Company of the current session.
    #[must_use]
    pub fn company_id(&self) -> i64 {
        self.record.company_id
    }

    /// Stateful double-submit token to prevent CSRF attacks.
    #[must_use]
    pub fn csrf_token(&self) -> &str {
        &self.record.csrf_token
    }

    /// Preferred language of the current session.
    #[must_use]
    pub fn language_id(&self) -> i64 {
        self.record.language_id
    }

    /// Profile of the user of the current session.
    #[must_use]
    pub fn profile_id(&self) -> i64 {
        self.record.profile_id
    }

    /// Backing row of the current session, `None` when non-persistent.
    #[must_use]
    pub fn session_id(&self) -> Option<i64> {
        self.record.session_id
    }

    /// The session token.
    #[must_use]
    pub fn session_token(&self) -> &str {
        &self.record.session_token
    }

    /// Authenticated user of the current session, `None` while anonymous.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.record.user_id
    }

    /// True until a user has logged in on this session.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.record.is_anonymous
    }

    /// The transport with any queued outbound cookies.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give up the manager and hand back the transport, for delivering the
    /// queued cookies with the response.
    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }
}

// =============================================================================
// Application Payload
// =============================================================================

impl<T: CookieTransport> SessionManager<T> {
    /// Read one value from the session payload.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Put one value into the session payload. Persisted at [`Self::save`].
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.payload.insert(key.into(), value);
    }

    /// Remove one value from the session payload.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.payload.remove(key)
    }

    /// Drop the whole session payload.
    pub fn clear(&mut self) {
        self.payload.clear();
    }

    /// The hydrated payload mapping.
    #[must_use]
    pub fn payload(&self) -> &HashMap<String, Value> {
        &self.payload
    }
}
