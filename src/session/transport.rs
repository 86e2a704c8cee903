//! Cookie transport seam.
//!
//! The session manager never talks to the HTTP layer directly; it reads the
//! inbound session token from, and hands outbound cookies to, a
//! [`CookieTransport`]. The [`RequestCookies`] adapter binds the seam to an
//! actix-web request/response cycle.

use actix_web::cookie::Cookie;
use actix_web::{HttpRequest, HttpResponseBuilder};

use crate::session::cookie::SESSION_COOKIE_NAME;

/// The session manager's view of the current request/response cycle.
pub trait CookieTransport {
    /// The session token the client presented, if any.
    fn session_token(&self) -> Option<String>;

    /// Whether the channel is encrypted. Cookies carrying bearer tokens are
    /// only ever written over an encrypted channel.
    fn is_encrypted(&self) -> bool;

    /// The canonical hostname the cookies are scoped to.
    fn canonical_hostname(&self) -> &str;

    /// Queue a cookie for delivery with the response.
    fn send(&mut self, cookie: Cookie<'static>);
}

/// [`CookieTransport`] over an actix-web request.
///
/// Captures what the manager needs up front so it does not borrow the
/// request; outbound cookies are collected and applied to the response
/// builder at the end of the request.
pub struct RequestCookies {
    inbound_token: Option<String>,
    encrypted: bool,
    hostname: String,
    outbound: Vec<Cookie<'static>>,
}

impl RequestCookies {
    /// Capture the cookie-relevant parts of a request.
    ///
    /// The channel counts as encrypted when the connection (or a trusted
    /// forwarding proxy) reports the `https` scheme.
    #[must_use]
    pub fn from_request(req: &HttpRequest, canonical_hostname: &str) -> Self {
        let inbound_token = req
            .cookie(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().to_owned());
        let encrypted = req.connection_info().scheme() == "https";

        Self {
            inbound_token,
            encrypted,
            hostname: canonical_hostname.to_owned(),
            outbound: Vec::new(),
        }
    }

    /// Apply all queued cookies to a response builder.
    pub fn apply_to(self, response: &mut HttpResponseBuilder) {
        for cookie in self.outbound {
            response.cookie(cookie);
        }
    }

    /// The queued outbound cookies.
    #[must_use]
    pub fn cookies(&self) -> &[Cookie<'static>] {
        &self.outbound
    }
}

impl CookieTransport for RequestCookies {
    fn session_token(&self) -> Option<String> {
        self.inbound_token.clone()
    }

    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn canonical_hostname(&self) -> &str {
        &self.hostname
    }

    fn send(&mut self, cookie: Cookie<'static>) {
        self.outbound.push(cookie);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_reads_inbound_session_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE_NAME, "inbound-token"))
            .to_http_request();

        let transport = RequestCookies::from_request(&req, "www.example.com");

        assert_eq!(transport.session_token(), Some("inbound-token".to_string()));
        assert_eq!(transport.canonical_hostname(), "www.example.com");
    }

    #[test]
    fn test_missing_cookie_reads_as_none() {
        let req = TestRequest::default().to_http_request();
        let transport = RequestCookies::from_request(&req, "www.example.com");

        assert!(transport.session_token().is_none());
    }

    #[test]
    fn test_scheme_decides_encryption() {
        let plain = TestRequest::with_uri("http://www.example.com/").to_http_request();
        assert!(!RequestCookies::from_request(&plain, "www.example.com").is_encrypted());

        let tls = TestRequest::with_uri("https://www.example.com/").to_http_request();
        assert!(RequestCookies::from_request(&tls, "www.example.com").is_encrypted());
    }

    #[test]
    fn test_queued_cookies_reach_the_response() {
        let req = TestRequest::default().to_http_request();
        let mut transport = RequestCookies::from_request(&req, "www.example.com");
        transport.send(Cookie::new("a", "1"));
        transport.send(Cookie::new("b", "2"));

        assert_eq!(transport.cookies().len(), 2);

        let mut builder = actix_web::HttpResponse::Ok();
        transport.apply_to(&mut builder);
        let response = builder.finish();

        let set_cookies: Vec<_> = response.cookies().collect();
        assert_eq!(set_cookies.len(), 2);
    }
}
