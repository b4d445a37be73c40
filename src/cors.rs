// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cross-origin policy.
//!
//! [`OriginPolicy::decide`] is a pure decision over the request's `Origin`;
//! the [`cors`] middleware turns the decision into headers, a 403, or a 204
//! preflight answer. It wraps the whole router, so it runs before method
//! matching and authentication on every path.

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
            ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN, VARY,
        },
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const DEFAULT_ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";
const EXPOSED_HEADERS: &str = "Content-Length, Content-Disposition";
const MAX_AGE_SECS: &str = "600";

/// Outcome of an origin check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsDecision {
    /// Echo this origin back.
    AllowExact(String),
    /// `Access-Control-Allow-Origin: *`.
    AllowWildcard,
    /// Reject with 403.
    Deny,
    /// Set no CORS headers and continue.
    Omit,
}

/// Origin allow-list, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPolicy {
    allow_all: bool,
    origins: Vec<String>,
}

impl OriginPolicy {
    /// Any `*` entry, or an empty list, allows every origin.
    pub fn from_list(origins: Vec<String>) -> Self {
        let allow_all = origins.is_empty() || origins.iter().any(|o| o == "*");
        Self { allow_all, origins }
    }

    pub fn allow_all() -> Self {
        Self::from_list(Vec::new())
    }

    pub fn decide(&self, origin: Option<&str>) -> CorsDecision {
        match origin {
            Some(origin) if self.allow_all || self.is_listed(origin) => {
                CorsDecision::AllowExact(origin.to_string())
            }
            Some(_) => CorsDecision::Deny,
            None if self.allow_all => CorsDecision::AllowWildcard,
            None => CorsDecision::Omit,
        }
    }

    fn is_listed(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o.eq_ignore_ascii_case(origin))
    }
}

/// CORS middleware.
pub async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = match request.headers().get(ORIGIN) {
        None => None,
        Some(value) => match value.to_str() {
            Ok(origin) => Some(origin.to_string()),
            Err(_) => return deny("<non-ascii>"),
        },
    };

    let decision = state.origin_policy.decide(origin.as_deref());
    let allow_origin = match &decision {
        CorsDecision::Deny => return deny(origin.as_deref().unwrap_or_default()),
        CorsDecision::Omit => None,
        CorsDecision::AllowWildcard => Some(HeaderValue::from_static("*")),
        CorsDecision::AllowExact(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => return deny(origin),
        },
    };

    let allow_headers = request
        .headers()
        .get(ACCESS_CONTROL_REQUEST_HEADERS)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_ALLOWED_HEADERS));

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    if let Some(allow_origin) = allow_origin {
        let echoed = matches!(decision, CorsDecision::AllowExact(_));
        apply_headers(response.headers_mut(), allow_origin, echoed, allow_headers);
    }
    response
}

fn apply_headers(
    headers: &mut HeaderMap,
    allow_origin: HeaderValue,
    echoed: bool,
    allow_headers: HeaderValue,
) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    if echoed {
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }
    headers.append(VARY, HeaderValue::from_static("Access-Control-Request-Method"));
    headers.append(VARY, HeaderValue::from_static("Access-Control-Request-Headers"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSED_HEADERS),
    );
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
}

fn deny(origin: &str) -> Response {
    warn!(origin, "Rejected cross-origin request");
    ApiError::forbidden("CORS origin not allowed").into_response()
}
