//! Session authentication.
//!
//! Sessions are issued by the web client's auth service and stored in the
//! shared `sessions` table; this server only resolves them. A request is
//! authenticated by the session cookie or, failing that, an
//! `Authorization: Bearer <token>` header.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::{ApiError, AppState};

/// Prefix browsers require for cookies set with `Secure` over HTTPS.
const SECURE_COOKIE_PREFIX: &str = "__Secure-";

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = session_token(&parts.headers, &state.session_cookie_name)
            .ok_or(ApiError::Unauthorized)?;

        let session = state
            .sessions
            .find_by_token(&token)
            .await?
            .filter(|s| !s.is_expired_at(Utc::now()))
            .ok_or_else(|| {
                debug!(
                    subsystem = "api",
                    component = "auth",
                    "Unknown or expired session token"
                );
                ApiError::Unauthorized
            })?;

        Ok(AuthUser {
            user_id: session.user_id,
            session_id: session.session_id,
        })
    }
}

/// Extract the session token from the cookie or the bearer header.
///
/// Signed cookie values have the form `token.signature`; only the token part
/// is looked up.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    cookie_token(headers, cookie_name).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let secure_name = format!("{}{}", SECURE_COOKIE_PREFIX, cookie_name);

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name || *name == secure_name)
        .and_then(|(_, value)| {
            let token = value.trim().trim_matches('"');
            let token = token.split('.').next().unwrap_or(token);
            (!token.is_empty()).then(|| token.to_string())
        })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const COOKIE_NAME: &str = "learnessence.session_token";

    fn headers(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_cookie_token_strips_signature() {
        let h = headers(&[(
            COOKIE,
            "theme=dark; learnessence.session_token=abc123.c2lnbmF0dXJl; other=1",
        )]);
        assert_eq!(session_token(&h, COOKIE_NAME).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_unsigned_cookie_token() {
        let h = headers(&[(COOKIE, "learnessence.session_token=plain")]);
        assert_eq!(session_token(&h, COOKIE_NAME).as_deref(), Some("plain"));
    }

    #[test]
    fn test_secure_prefixed_cookie() {
        let h = headers(&[(COOKIE, "__Secure-learnessence.session_token=tok.sig")]);
        assert_eq!(session_token(&h, COOKIE_NAME).as_deref(), Some("tok"));
    }

    #[test]
    fn test_bearer_fallback() {
        let h = headers(&[(AUTHORIZATION, "Bearer xyz")]);
        assert_eq!(session_token(&h, COOKIE_NAME).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_cookie_wins_over_bearer() {
        let h = headers(&[
            (AUTHORIZATION, "Bearer from-header"),
            (COOKIE, "learnessence.session_token=from-cookie"),
        ]);
        assert_eq!(
            session_token(&h, COOKIE_NAME).as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn test_missing_or_empty_token() {
        assert!(session_token(&HeaderMap::new(), COOKIE_NAME).is_none());
        let h = headers(&[(COOKIE, "learnessence.session_token=")]);
        assert!(session_token(&h, COOKIE_NAME).is_none());
        let h = headers(&[(AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert!(session_token(&h, COOKIE_NAME).is_none());
    }
}
