use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Serialize;

use super::SessionClaims;

/// Identity resolved for the current request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Session {
    /// Email of the signed-in user, if the session carries a usable one.
    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref().filter(|email| !email.trim().is_empty())
    }
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user: SessionUser {
                id: claims.sub,
                email: claims.email,
                name: claims.name,
            },
            expires: DateTime::<Utc>::from_timestamp(claims.exp, 0),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session secret not configured")]
    SecretMissing,
}

/// Resolves the session for an inbound request.
///
/// `Ok(None)` means the caller is anonymous; `Err` is reserved for failures of
/// the provider itself.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError>;
}

/// Stateless sessions backed by HS256-signed tokens.
#[derive(Clone)]
pub struct JwtSessionProvider {
    secret: String,
    cookie_name: String,
}

impl JwtSessionProvider {
    pub fn new(secret: impl Into<String>, cookie_name: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            cookie_name: cookie_name.into(),
        }
    }

    fn decode_claims(&self, token: &str) -> Result<SessionClaims, String> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        decode::<SessionClaims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| format!("Invalid session token: {}", e))
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn current_session(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        if self.secret.is_empty() {
            return Err(SessionError::SecretMissing);
        }

        let Some(token) = extract_session_token(headers, &self.cookie_name) else {
            return Ok(None);
        };

        match self.decode_claims(&token) {
            Ok(claims) => Ok(Some(Session::from(claims))),
            Err(msg) => {
                tracing::debug!("Rejecting session: {}", msg);
                Ok(None)
            }
        }
    }
}

/// Token from `Authorization: Bearer`, falling back to the session cookie
/// when there is no usable bearer token.
fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    match bearer_token(headers) {
        Ok(Some(token)) => return Some(token),
        Ok(None) => {}
        Err(msg) => tracing::debug!("Ignoring Authorization header: {}", msg),
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|token| !token.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, &'static str> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_str = auth_header.to_str().map_err(|_| "invalid header encoding")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        Some(_) => Err("empty bearer token"),
        None => Err("not a Bearer scheme"),
    }
}
