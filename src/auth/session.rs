use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::db::models::User;

const SESSION_COOKIE: &str = "policyseek_session";
const SESSION_LIFETIME_DAYS: i64 = 14;

/// Minimal identity claim carried in the encrypted session cookie. The
/// server holds no session state; the cookie is the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
}

pub fn start_session(jar: PrivateCookieJar, user: &User) -> PrivateCookieJar {
    let claim = SessionUser {
        user_id: user.id,
        username: user.username.clone(),
    };
    // Serializing a two-field struct of plain values cannot fail.
    let value = serde_json::to_string(&claim).unwrap_or_default();
    jar.add(session_cookie(value))
}

pub fn end_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(clear_cookie())
}

/// `None` covers every way a request can be unauthenticated: no cookie,
/// failed decryption, stale or unparseable claim.
pub fn current_user(jar: &PrivateCookieJar) -> Option<SessionUser> {
    let cookie = jar.get(SESSION_COOKIE)?;
    serde_json::from_str(cookie.value()).ok()
}

fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE.to_string(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(SESSION_LIFETIME_DAYS))
        .build()
}

fn clear_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE.to_string(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Extractor for routes behind login. Rejection is a redirect to the login
/// page, never an error status.
#[derive(Debug, Clone)]
pub struct RequireLogin(pub SessionUser);

impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = match PrivateCookieJar::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(_) => return Err(Redirect::to("/login")),
        };
        current_user(&jar)
            .map(RequireLogin)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            password_hash: "irrelevant".to_string(),
        }
    }

    #[test]
    fn start_then_read_session() {
        let jar = PrivateCookieJar::new(Key::generate());
        let jar = start_session(jar, &test_user());

        let claim = current_user(&jar).expect("session claim present");
        assert_eq!(claim.user_id, 7);
        assert_eq!(claim.username, "alice");
    }

    #[test]
    fn end_session_clears_claim() {
        let jar = PrivateCookieJar::new(Key::generate());
        let jar = start_session(jar, &test_user());
        let jar = end_session(jar);
        assert!(current_user(&jar).is_none());
    }

    #[test]
    fn empty_jar_has_no_user() {
        let jar = PrivateCookieJar::new(Key::generate());
        assert!(current_user(&jar).is_none());
    }
}
