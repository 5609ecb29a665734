//! JWT-based authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use onboard_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Cookie the portal stores the access token in when it does not send a
/// bearer header.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user extracted from a JWT, read from the `Authorization:
/// Bearer` header or the [`ACCESS_TOKEN_COOKIE`] cookie.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// Owner flag from the token. Never used for authorization; see
    /// [`RequireOwner`](super::guards::RequireOwner).
    pub is_owner: bool,
}

/// Pull the raw token out of the request, if any was sent.
fn token_from_parts(parts: &Parts) -> Result<Option<String>, AppError> {
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        let header = header
            .to_str()
            .map_err(|_| AppError::unauthorized("Malformed Authorization header"))?;
        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid Authorization format. Expected: Bearer <token>")
        })?;
        return Ok(Some(token.trim().to_string()));
    }

    let from_cookie = parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value.to_string());
    Ok(from_cookie)
}

fn authenticate(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;
    Ok(AuthUser {
        user_id: claims.sub,
        is_owner: claims.is_owner,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)?
            .ok_or_else(|| AppError::unauthorized("Missing credentials"))?;
        authenticate(&token, state)
    }
}

/// Optional authentication for public endpoints.
///
/// Anonymous requests yield `None`; a request that does carry credentials
/// must carry valid ones.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<DbId> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match token_from_parts(parts)? {
            Some(token) => authenticate(&token, state).map(|u| MaybeAuthUser(Some(u))),
            None => Ok(MaybeAuthUser(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_header_wins() {
        let p = parts(&[("authorization", "Bearer abc"), ("cookie", "access_token=xyz")]);
        assert_eq!(token_from_parts(&p).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_fallback() {
        let p = parts(&[("cookie", "theme=dark; access_token=xyz; other=1")]);
        assert_eq!(token_from_parts(&p).unwrap().as_deref(), Some("xyz"));
    }

    #[test]
    fn no_credentials_is_none() {
        let p = parts(&[("cookie", "theme=dark")]);
        assert!(token_from_parts(&p).unwrap().is_none());
    }

    #[test]
    fn non_bearer_scheme_rejected() {
        let p = parts(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert!(token_from_parts(&p).is_err());
    }
}
