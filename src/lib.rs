#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::module_name_repetitions)]

/// Version of the tessera-session crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod context;
pub mod models;
pub mod session;
pub mod settings;
pub mod store;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use context::{ContextResolver, FixedContext};
pub use models::SessionRecord;
pub use session::{
    CookieTransport, RequestCookies, SessionError, SessionManager, CSRF_COOKIE_NAME,
    SESSION_COOKIE_NAME,
};
pub use settings::{SessionSettings, TesseraSettings};
pub use store::{MemoryStore, SessionStore, StoreError};
