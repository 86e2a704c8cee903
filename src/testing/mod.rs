//! Testing utilities
//!
//! Mock collaborators and fixtures for exercising the session lifecycle in
//! isolation. Available to integration tests through the `testing` feature.

pub mod fixtures;
pub mod mock;

pub use fixtures::{expired_settings, urandom_settings, RecordBuilder};
pub use mock::{MockStore, MockTransport};
