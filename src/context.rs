//! Request context resolution.
//!
//! The session core does not know how the active company or the default
//! language are derived; the surrounding application supplies them through
//! the [`ContextResolver`] trait.

/// Supplies the active company and the default language for new sessions.
pub trait ContextResolver: Send + Sync {
    /// The company the current request belongs to.
    fn company_id(&self) -> i64;

    /// The language a freshly started or restarted session begins with.
    fn default_language_id(&self) -> i64;
}

/// A resolver that always answers with the same company and language.
///
/// Suits single-tenant deployments and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedContext {
    company_id: i64,
    language_id: i64,
}

impl FixedContext {
    #[must_use]
    pub const fn new(company_id: i64, language_id: i64) -> Self {
        Self {
            company_id,
            language_id,
        }
    }
}

impl ContextResolver for FixedContext {
    fn company_id(&self) -> i64 {
        self.company_id
    }

    fn default_language_id(&self) -> i64 {
        self.language_id
    }
}
