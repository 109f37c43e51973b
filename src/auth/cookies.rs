//! Transport of the (user id, token) pair in two plain cookies.
//!
//! Values are written and read verbatim: no signing, no encryption.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use time::OffsetDateTime;

use crate::config::{SameSitePolicy, SessionConfig};
use crate::db::Token;

#[derive(Debug, Clone)]
pub struct SessionCarrier {
    id_cookie: String,
    token_cookie: String,
    lifetime: Duration,
    http_only: bool,
    secure: bool,
    same_site: Option<SameSite>,
}

impl SessionCarrier {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            id_cookie: config.id_cookie.clone(),
            token_cookie: config.token_cookie.clone(),
            lifetime: Duration::hours(config.lifetime_hours),
            http_only: config.http_only,
            secure: config.secure,
            same_site: config.same_site.map(|policy| match policy {
                SameSitePolicy::Strict => SameSite::Strict,
                SameSitePolicy::Lax => SameSite::Lax,
                SameSitePolicy::None => SameSite::None,
            }),
        }
    }

    /// Read the session pair. `None` when either cookie is missing or empty.
    pub fn read(&self, jar: &CookieJar) -> Option<Token> {
        let user_id = jar.get(&self.id_cookie)?.value();
        let token = jar.get(&self.token_cookie)?.value();
        if user_id.is_empty() || token.is_empty() {
            return None;
        }
        Some(Token::new(user_id, token))
    }

    pub fn read_from_headers(&self, headers: &HeaderMap) -> Option<Token> {
        self.read(&CookieJar::from_headers(headers))
    }

    /// Add both session cookies to the jar, replacing any with the same names.
    /// They expire `lifetime` after `issued_at`.
    pub fn write(&self, jar: CookieJar, token: &Token, issued_at: DateTime<Utc>) -> CookieJar {
        let expires = expiry(issued_at + self.lifetime);
        jar.add(self.cookie(&self.id_cookie, &token.user_id, expires))
            .add(self.cookie(&self.token_cookie, &token.token, expires))
    }

    fn cookie(
        &self,
        name: &str,
        value: &str,
        expires: Option<OffsetDateTime>,
    ) -> Cookie<'static> {
        let mut builder = Cookie::build((name.to_string(), value.to_string()))
            .path("/")
            .http_only(self.http_only)
            .secure(self.secure);
        if let Some(same_site) = self.same_site {
            builder = builder.same_site(same_site);
        }
        if let Some(expires) = expires {
            builder = builder.expires(expires);
        }
        builder.build()
    }
}

fn expiry(at: DateTime<Utc>) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(at.timestamp()).ok()
}
