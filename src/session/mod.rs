//! Session Management Module
//!
//! The session lifecycle lives here: one [`SessionManager`] per request
//! resolves the session record (create, resume, or restart-after-expiry),
//! rotates the secret tokens at identity-changing transitions and binds the
//! session to the transport through a pair of cookies.
//!
//! # Modules
//!
//! - [`manager`] - Core state machine and token rotation protocol
//! - [`cookie`] - Cookie construction with the required scope and flags
//! - [`transport`] - Transport seam and the actix-web request adapter

pub mod cookie;
pub mod manager;
pub mod transport;

// Re-export commonly used items for convenience
pub use cookie::{CookieFactory, CookieOptions, CSRF_COOKIE_NAME, SESSION_COOKIE_NAME};
pub use manager::{SessionError, SessionManager};
pub use transport::{CookieTransport, RequestCookies};
