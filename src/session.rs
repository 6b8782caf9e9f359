use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::warn;

use crate::{config::SessionConfig, error::AppError};

pub const SESSION_COOKIE: &str = "sessionId";

/// Session identifier taken verbatim from the `sessionId` cookie.
///
/// The value is not checked against any store; presence is the whole test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match jar.get(SESSION_COOKIE).map(|c| c.value()) {
            Some(value) if !value.is_empty() => Ok(SessionId(value.to_string())),
            _ => {
                warn!(uri = %parts.uri, "missing session cookie");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// Builds the cookie handed out at registration.
pub fn session_cookie(cfg: &SessionConfig, value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(cfg.max_age_days.saturating_mul(86_400)))
        .build()
}
