// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session tokens are HS256 JWTs issued by this server after Google sign-in.
//!
//! ## Auth Flow
//!
//! 1. `/auth/google/login` redirects to Google with a signed `state` value
//! 2. `/auth/google/callback` exchanges the code, upserts the user and
//!    redirects to the frontend with a session token
//! 3. The frontend sends `Authorization: Bearer <token>`
//! 4. [`Auth`] (or the [`require_auth`] middleware) verifies the token and
//!    exposes the [`Claims`] to the handler
//!
//! ## Security
//!
//! - Only HS256 is accepted; any other header algorithm is rejected
//! - Tokens expire 7 days after issue, `state` values after 10 minutes
//! - Every verification failure yields the same 401 body

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod token;

pub use claims::Claims;
pub use error::AuthError;
pub use extractor::{bearer_token, Auth};
pub use middleware::require_auth;
pub use token::{TokenCodec, TokenError};
