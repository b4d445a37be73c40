// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{body::Bytes, extract::State, Json};
use tracing::info;

use super::parse_json;
use crate::auth::Auth;
use crate::error::{ApiError, ErrorBody};
use crate::models::{MessageResponse, UserInfoResponse, UserRecord, UserRegistration};
use crate::state::AppState;
use crate::storage::StorageError;

/// Validate a registration payload.
///
/// Every failed rule is reported at once.
#[utoipa::path(
    post,
    path = "/user",
    tag = "Users",
    request_body = UserRegistration,
    responses(
        (status = 200, description = "Payload accepted", body = MessageResponse),
        (status = 400, description = "Invalid JSON or validation failure", body = ErrorBody),
    )
)]
pub async fn register_user(body: Bytes) -> Result<Json<MessageResponse>, ApiError> {
    let user: UserRegistration = parse_json(&body)?;

    let errors = user.validate();
    if !errors.is_empty() {
        info!(?errors, "Rejected user payload");
        return Err(ApiError::validation(&errors));
    }

    info!(name = %user.name, id = user.id, "Received valid user data");
    Ok(Json(MessageResponse::new(format!(
        "User {} with ID {} has been processed successfully",
        user.name, user.id
    ))))
}

/// Get the signed-in user's stored profile.
#[utoipa::path(
    get,
    path = "/auth/user",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserInfoResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 404, description = "User no longer exists", body = ErrorBody),
    )
)]
pub async fn current_user(
    Auth(claims): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserInfoResponse>, ApiError> {
    let user: UserRecord = state.users.get_by_id(claims.user_id).await.map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found(
            "User not found",
            format!("User with ID {} not found", claims.user_id),
        ),
        other => other.into(),
    })?;

    Ok(Json(UserInfoResponse {
        message: "User retrieved successfully".to_string(),
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;

    #[tokio::test]
    async fn register_rejects_empty_name() {
        let err = register_user(Bytes::from_static(br#"{"name":"","id":5}"#))
            .await
            .unwrap_err();
        assert_eq!(err.error, "Validation failed");
        assert!(err.message.contains("name is required"));
    }

    #[tokio::test]
    async fn register_accepts_valid_payload() {
        let Json(body) = register_user(Bytes::from_static(br#"{"name":"Amy","id":5}"#))
            .await
            .unwrap();
        assert_eq!(
            body.message,
            "User Amy with ID 5 has been processed successfully"
        );
    }

    #[tokio::test]
    async fn register_rejects_broken_json() {
        let err = register_user(Bytes::from_static(b"{not json"))
            .await
            .unwrap_err();
        assert_eq!(err.error, "Invalid JSON");
    }

    fn claims_for(user_id: i64) -> Claims {
        Claims {
            user_id,
            email: "amy@example.com".to_string(),
            google_id: "g-1".to_string(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[tokio::test]
    async fn current_user_returns_stored_profile() {
        let state = AppState::for_tests();
        let stored = state
            .users
            .upsert_by_external_id("g-1", "amy@example.com", "Amy", "https://p")
            .await
            .unwrap();

        let Json(body) = current_user(Auth(claims_for(stored.id)), State(state))
            .await
            .unwrap();
        assert_eq!(body.user, stored);
    }

    #[tokio::test]
    async fn current_user_missing_is_404() {
        let err = current_user(Auth(claims_for(41)), State(AppState::for_tests()))
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
        assert_eq!(err.error, "User not found");
    }
}
