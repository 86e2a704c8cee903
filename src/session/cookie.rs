use actix_web::cookie::{Cookie, SameSite};

/// Cookie carrying the session token. Read back on the next request.
pub const SESSION_COOKIE_NAME: &str = "ses_session_token";
/// Cookie carrying the CSRF token for the double-submit check.
pub const CSRF_COOKIE_NAME: &str = "ses_csrf_token";

/// Options for cookie creation
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
        }
    }
}

/// Builds the pair of session cookies with the right scope and flags.
///
/// Both cookies are host-scoped session cookies (no max-age): their lifetime
/// is the browser session, their validity is the server-side timeout.
#[derive(Debug, Clone)]
pub struct CookieFactory {
    domain: String,
}

impl CookieFactory {
    #[must_use]
    pub fn new(canonical_hostname: impl Into<String>) -> Self {
        Self {
            domain: canonical_hostname.into(),
        }
    }

    /// Generic method to create a cookie for this factory's host
    #[must_use]
    pub fn build(&self, name: &str, value: &str, options: CookieOptions) -> Cookie<'static> {
        Cookie::build(name.to_owned(), value.to_owned())
            .http_only(options.http_only)
            .secure(options.secure)
            .same_site(options.same_site)
            .path(options.path)
            .domain(self.domain.clone())
            .finish()
    }

    /// The session-token cookie. HTTP-only: the bearer token is never
    /// exposed to client-side code.
    #[must_use]
    pub fn session_cookie(&self, session_token: &str) -> Cookie<'static> {
        self.build(
            SESSION_COOKIE_NAME,
            session_token,
            CookieOptions::default(),
        )
    }

    /// The CSRF-token cookie. Not HTTP-only: the double-submit pattern
    /// requires client-side code to read the token and echo it back in a
    /// request header or body field.
    #[must_use]
    pub fn csrf_cookie(&self, csrf_token: &str) -> Cookie<'static> {
        self.build(
            CSRF_COOKIE_NAME,
            csrf_token,
            CookieOptions {
                http_only: false,
                ..Default::default()
            },
        )
    }
}
