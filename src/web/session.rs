//! Cookie-backed login sessions for the quotes site.
//!
//! A successful login stores a signed JWT in the `sessionid` cookie. The
//! extractors below resolve it back into a [`User`] on every request.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use super::error::SiteError;
use super::SiteState;
use crate::domain::User;

pub const SESSION_COOKIE: &str = "sessionid";
pub const LOGIN_PATH: &str = "/users/login";

/// The logged-in user. Anonymous requests are redirected to the login page.
pub struct LoginRequired(pub User);

#[async_trait]
impl FromRequestParts<SiteState> for LoginRequired {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SiteState,
    ) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await {
            Ok(Some(user)) => Ok(LoginRequired(user)),
            Ok(None) => Err(Redirect::to(LOGIN_PATH).into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}

/// The logged-in user, if any.
pub struct OptionalUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<SiteState> for OptionalUser {
    type Rejection = SiteError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SiteState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(session_user(parts, state).await?))
    }
}

async fn session_user(parts: &Parts, state: &SiteState) -> Result<Option<User>, SiteError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let claims = match state.jwt.verify_token(cookie.value()) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Ignoring invalid session cookie");
            return Ok(None);
        }
    };

    match claims.user_id() {
        Some(user_id) => Ok(state.repo.get_user(user_id).await?),
        None => Ok(None),
    }
}

/// HttpOnly cookie carrying a session token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Drop the session cookie from `jar`.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
