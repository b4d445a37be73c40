// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims.user_id is the signed-in user
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, Claims, TokenCodec};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Reuses the claims placed by [`super::require_auth`] when the route runs
/// behind it, otherwise verifies the bearer token itself.
pub struct Auth(pub Claims);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(Auth(claims));
        }

        let claims = authenticate(&parts.headers, &state.tokens)?;
        parts.extensions.insert(claims.clone());
        Ok(Auth(claims))
    }
}

/// Verify the request's bearer token.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenCodec) -> Result<Claims, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = bearer_token(header)?;
    Ok(tokens.verify(token)?)
}

/// Extract the token from `Bearer <token>`: exact scheme, one space, and a
/// non-empty token without further spaces.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenError;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/auth/user");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_form_is_exact() {
        assert_eq!(bearer_token("Bearer abc").unwrap(), "abc");
        assert!(matches!(bearer_token("bearer abc"), Err(AuthError::InvalidAuthHeader)));
        assert!(matches!(bearer_token("Bearer"), Err(AuthError::InvalidAuthHeader)));
        assert!(matches!(bearer_token("Bearer "), Err(AuthError::InvalidAuthHeader)));
        assert!(matches!(bearer_token("Bearer a b"), Err(AuthError::InvalidAuthHeader)));
        assert!(matches!(bearer_token("Bearer  abc"), Err(AuthError::InvalidAuthHeader)));
        assert!(matches!(bearer_token("Basic abc"), Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = AppState::for_tests();
        let mut parts = parts_with(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_token() {
        let state = AppState::for_tests();
        let token = state.tokens.issue(7, "amy@example.com", "g-7").unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {token}")));

        let Auth(claims) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(parts.extensions.get::<Claims>(), Some(&claims));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_foreign_token() {
        let state = AppState::for_tests();
        let token = TokenCodec::new("someone-else")
            .issue(7, "amy@example.com", "g-7")
            .unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(
            result,
            Err(AuthError::InvalidToken(TokenError::SignatureMismatch))
        ));
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let state = AppState::for_tests();
        let mut parts = parts_with(None);
        let claims = Claims {
            user_id: 99,
            email: "from-middleware@example.com".to_string(),
            google_id: "g-99".to_string(),
            iat: 0,
            exp: 0,
        };
        parts.extensions.insert(claims);

        let Auth(found) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(found.user_id, 99);
    }
}
