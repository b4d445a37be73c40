// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Google sign-in endpoints.

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::{error, info, warn};
use utoipa::IntoParams;

use crate::auth::TokenError;
use crate::error::{ApiError, ErrorBody};
use crate::providers::ProviderError;
use crate::state::AppState;

/// Query string Google appends to the callback URL.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set instead of `code` when the user declines consent.
    pub error: Option<String>,
}

fn oauth_not_configured() -> ApiError {
    ApiError::configuration("OAuth not configured")
}

fn token_failure(err: TokenError) -> ApiError {
    error!(error = %err, "Failed to sign token");
    ApiError::configuration("Failed to generate token")
}

/// Redirect to the Google consent page.
#[utoipa::path(
    get,
    path = "/auth/google/login",
    tag = "Auth",
    responses(
        (status = 307, description = "Redirect to Google"),
        (status = 500, description = "OAuth not configured", body = ErrorBody),
    )
)]
pub async fn google_login(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let identity = state.identity.as_ref().ok_or_else(oauth_not_configured)?;
    let csrf_state = state.tokens.issue_state().map_err(token_failure)?;
    Ok(Redirect::temporary(&identity.authorize_url(&csrf_state)))
}

/// Finish sign-in: exchange the code, store the user, and send the browser
/// back to the frontend with a session token.
#[utoipa::path(
    get,
    path = "/auth/google/callback",
    tag = "Auth",
    params(CallbackParams),
    responses(
        (status = 307, description = "Redirect to the frontend with `?token=`"),
        (status = 400, description = "Missing code or invalid state", body = ErrorBody),
        (status = 500, description = "Exchange, storage or signing failure", body = ErrorBody),
    )
)]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, ApiError> {
    if let Some(reason) = params.error.as_deref() {
        warn!(reason, "Google sign-in was not completed");
        return Err(ApiError::bad_request(
            "Authorization denied",
            format!("Google returned: {reason}"),
        ));
    }

    let code = params
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("No code in callback", "Missing authorization code"))?;

    let csrf_state = params.state.as_deref().unwrap_or_default();
    if let Err(e) = state.tokens.verify_state(csrf_state) {
        warn!(error = %e, "Rejected OAuth callback state");
        return Err(ApiError::bad_request(
            "Invalid state",
            "The sign-in request expired or was not issued by this server",
        ));
    }

    let identity = state.identity.as_ref().ok_or_else(oauth_not_configured)?;
    let profile = identity.exchange(code).await.map_err(|e| {
        error!(error = %e, "Google sign-in failed");
        match e {
            ProviderError::ProfileFetchFailed(_) => ApiError::upstream("Failed to get user info"),
            _ => ApiError::upstream("Failed to exchange token"),
        }
    })?;

    let user = state
        .users
        .upsert_by_external_id(&profile.id, &profile.email, &profile.name, &profile.picture)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create or update user");
            ApiError::database("Failed to save user")
        })?;

    let token = state
        .tokens
        .issue(user.id, &user.email, &user.google_id)
        .map_err(token_failure)?;

    info!(user_id = user.id, "User signed in");
    Ok(Redirect::temporary(&format!(
        "{}/auth/callback?token={token}",
        state.frontend_url
    )))
}
