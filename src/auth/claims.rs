// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims carried by session and OAuth `state` tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims of a session token.
///
/// Created once at login and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Local user id.
    pub user_id: i64,
    pub email: String,
    /// Google account id of the user.
    pub google_id: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiration (Unix seconds).
    pub exp: i64,
}

/// Claims of an OAuth `state` value.
///
/// Shares no required field with [`Claims`], so neither token kind
/// deserializes as the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StateClaims {
    pub purpose: String,
    pub nonce: String,
    pub iat: i64,
    pub exp: i64,
}

/// Only the expiry, read before the signature is checked.
#[derive(Debug, Deserialize)]
pub(crate) struct ExpiryProbe {
    pub exp: i64,
}
