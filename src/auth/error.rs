// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::TokenError;
use crate::error::ApiError;

const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// Authentication error type.
///
/// The client only ever sees "Authentication required" or "Invalid or
/// expired token"; the precise [`TokenError`] is logged.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authorization header is required")]
    MissingAuthHeader,

    #[error("authorization header must be 'Bearer <token>'")]
    InvalidAuthHeader,

    #[error("token rejected: {0}")]
    InvalidToken(TokenError),

    #[error("token secret is not configured")]
    Misconfigured,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingSecret => AuthError::Misconfigured,
            other => AuthError::InvalidToken(other),
        }
    }
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader => {
                ApiError::unauthorized("Authentication required")
            }
            AuthError::InvalidToken(_) => ApiError::unauthorized(INVALID_TOKEN_MESSAGE),
            AuthError::Misconfigured => ApiError::configuration("Server configuration error"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Misconfigured => tracing::error!("Rejecting request: {self}"),
            _ => warn!(reason = %self, "Rejecting unauthenticated request"),
        }
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AuthError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn token_failures_share_one_body() {
        let (s1, expired) = body_of(TokenError::Expired.into()).await;
        let (s2, mismatch) = body_of(TokenError::SignatureMismatch.into()).await;
        let (s3, malformed) = body_of(TokenError::Malformed.into()).await;

        assert_eq!(s1, StatusCode::UNAUTHORIZED);
        assert_eq!(s2, StatusCode::UNAUTHORIZED);
        assert_eq!(s3, StatusCode::UNAUTHORIZED);
        assert_eq!(expired, mismatch);
        assert_eq!(mismatch, malformed);
        assert_eq!(
            expired,
            serde_json::json!({"error": "Unauthorized", "message": "Invalid or expired token"})
        );
    }

    #[tokio::test]
    async fn missing_header_returns_401() {
        let (status, body) = body_of(AuthError::MissingAuthHeader).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Authentication required");
    }

    #[tokio::test]
    async fn missing_secret_returns_500() {
        let err = AuthError::from(TokenError::MissingSecret);
        assert!(matches!(err, AuthError::Misconfigured));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Configuration error");
    }
}
