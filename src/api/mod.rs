// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Bytes,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::debug;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_auth, Claims},
    cors,
    error::{ApiError, ErrorBody},
    models::{
        Article, ArticleInput, ArticleListResponse, ArticleResponse, MessageResponse,
        UploadResponse, UserInfoResponse, UserRecord, UserRegistration,
    },
    state::AppState,
};

pub mod articles;
pub mod auth;
pub mod health;
pub mod upload;
pub mod users;

/// Decode a JSON body, mapping any failure to the `Invalid JSON` envelope.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Rejected request body");
        ApiError::bad_request("Invalid JSON", "Could not parse JSON request body")
    })
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found", "The requested resource does not exist")
}

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(health::hello).fallback(method_not_allowed))
        .route("/health", get(health::health).fallback(method_not_allowed))
        .route("/health/live", get(health::liveness).fallback(method_not_allowed))
        .route("/health/ready", get(health::readiness).fallback(method_not_allowed))
        .route("/user", post(users::register_user).fallback(method_not_allowed))
        .route(
            "/articles",
            get(articles::list_articles)
                .post(articles::create_article)
                .fallback(method_not_allowed),
        )
        .route(
            "/article/filter/{mode}/{keyword}",
            get(articles::filter_articles).fallback(method_not_allowed),
        )
        .route(
            "/article/{id}",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article)
                .fallback(method_not_allowed),
        )
        .route(
            "/auth/google/login",
            get(auth::google_login).fallback(method_not_allowed),
        )
        .route(
            "/auth/google/callback",
            get(auth::google_callback).fallback(method_not_allowed),
        )
        .route(
            "/auth/user",
            get(users::current_user)
                .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
                .fallback(method_not_allowed),
        )
        .route(
            "/upload",
            post(upload::upload_file)
                .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
                .layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES))
                .fallback(method_not_allowed),
        )
        .with_state(state.clone());

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state, cors::cors))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::hello,
        health::health,
        health::liveness,
        health::readiness,
        users::register_user,
        users::current_user,
        articles::list_articles,
        articles::create_article,
        articles::get_article,
        articles::update_article,
        articles::delete_article,
        articles::filter_articles,
        auth::google_login,
        auth::google_callback,
        upload::upload_file
    ),
    components(
        schemas(
            Article,
            ArticleInput,
            ArticleListResponse,
            ArticleResponse,
            MessageResponse,
            UserRegistration,
            UserRecord,
            UserInfoResponse,
            UploadResponse,
            Claims,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Greeting and health probes"),
        (name = "Articles", description = "Article CRUD and keyword search"),
        (name = "Users", description = "User payload validation and profile lookup"),
        (name = "Auth", description = "Google sign-in"),
        (name = "Upload", description = "Google Drive file upload")
    )
)]
struct ApiDoc;
