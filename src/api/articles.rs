// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Article endpoints.
//!
//! Reads are public; create, update and delete require a session token.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::parse_json;
use crate::auth::Auth;
use crate::error::{ApiError, ErrorBody};
use crate::models::{ArticleInput, ArticleListResponse, ArticleResponse, MessageResponse};
use crate::state::AppState;
use crate::storage::StorageError;

/// Keyword filter scope for `/article/filter/{mode}/{keyword}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Title,
    All,
}

impl FilterMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "title" => Some(Self::Title),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid ID", "Article ID must be a valid integer"))
}

fn article_error(id: i64, err: StorageError) -> ApiError {
    match err {
        StorageError::NotFound(_) => ApiError::not_found(
            "Article not found",
            format!("Article with ID {id} not found"),
        ),
        other => other.into(),
    }
}

fn validated_input(body: &Bytes) -> Result<ArticleInput, ApiError> {
    let input: ArticleInput = parse_json(body)?;
    let errors = input.validate();
    if !errors.is_empty() {
        return Err(ApiError::validation(&errors));
    }
    Ok(input)
}

/// List all articles that are not deleted, newest first.
#[utoipa::path(
    get,
    path = "/articles",
    tag = "Articles",
    responses(
        (status = 200, description = "Active articles", body = ArticleListResponse),
        (status = 500, description = "Database error", body = ErrorBody),
    )
)]
pub async fn list_articles(State(state): State<AppState>) -> Result<Json<ArticleListResponse>, ApiError> {
    let articles = state.articles.list_active().await?;
    info!(count = articles.len(), "Fetched articles");
    Ok(Json(ArticleListResponse::new(
        format!("Successfully retrieved {} articles", articles.len()),
        articles,
    )))
}

/// Create an article.
#[utoipa::path(
    post,
    path = "/articles",
    tag = "Articles",
    security(("bearer" = [])),
    request_body = ArticleInput,
    responses(
        (status = 201, description = "Article created", body = ArticleResponse),
        (status = 400, description = "Invalid JSON or validation failure", body = ErrorBody),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
    )
)]
pub async fn create_article(
    Auth(claims): Auth,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    let input = validated_input(&body)?;
    let article = state.articles.create(&input.title, &input.content).await?;
    info!(id = article.id, user_id = claims.user_id, "Article created");

    Ok((
        StatusCode::CREATED,
        Json(ArticleResponse {
            message: "Article created successfully".to_string(),
            article,
        }),
    ))
}

/// Get one article by id.
#[utoipa::path(
    get,
    path = "/article/{id}",
    tag = "Articles",
    params(("id" = i64, Path, description = "Article id")),
    responses(
        (status = 200, description = "The article", body = ArticleResponse),
        (status = 400, description = "Id is not an integer", body = ErrorBody),
        (status = 404, description = "No such article", body = ErrorBody),
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    let article = state
        .articles
        .get_by_id(id)
        .await
        .map_err(|e| article_error(id, e))?;
    info!(id, title = %article.title, "Fetched article");

    Ok(Json(ArticleResponse {
        message: "Successfully retrieved article".to_string(),
        article,
    }))
}

/// Replace an article's title and content.
#[utoipa::path(
    put,
    path = "/article/{id}",
    tag = "Articles",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Article id")),
    request_body = ArticleInput,
    responses(
        (status = 200, description = "Updated article", body = ArticleResponse),
        (status = 400, description = "Invalid id, JSON or fields", body = ErrorBody),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 404, description = "No such article", body = ErrorBody),
    )
)]
pub async fn update_article(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<ArticleResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    let input = validated_input(&body)?;
    let article = state
        .articles
        .update(id, &input.title, &input.content)
        .await
        .map_err(|e| article_error(id, e))?;
    info!(id, user_id = claims.user_id, "Article updated");

    Ok(Json(ArticleResponse {
        message: "Article updated successfully".to_string(),
        article,
    }))
}

/// Soft-delete an article.
#[utoipa::path(
    delete,
    path = "/article/{id}",
    tag = "Articles",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Article id")),
    responses(
        (status = 200, description = "Article deleted", body = MessageResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 404, description = "No such article", body = ErrorBody),
    )
)]
pub async fn delete_article(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    state
        .articles
        .soft_delete(id)
        .await
        .map_err(|e| article_error(id, e))?;
    info!(id, user_id = claims.user_id, "Article deleted");

    Ok(Json(MessageResponse::new(format!(
        "Article {id} deleted successfully"
    ))))
}

/// Search articles by keyword in the title (`title`) or title and content (`all`).
#[utoipa::path(
    get,
    path = "/article/filter/{mode}/{keyword}",
    tag = "Articles",
    params(
        ("mode" = String, Path, description = "`title` or `all`"),
        ("keyword" = String, Path, description = "Literal substring to look for")
    ),
    responses(
        (status = 200, description = "Matching articles", body = ArticleListResponse),
        (status = 400, description = "Unknown mode or empty keyword", body = ErrorBody),
    )
)]
pub async fn filter_articles(
    State(state): State<AppState>,
    Path((raw_mode, keyword)): Path<(String, String)>,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let mode = FilterMode::parse(&raw_mode).ok_or_else(|| {
        ApiError::bad_request("Invalid filter mode", "Filter mode must be 'title' or 'all'")
    })?;
    if keyword.trim().is_empty() {
        return Err(ApiError::bad_request(
            "Invalid keyword",
            "Search keyword must not be empty",
        ));
    }

    let articles = match mode {
        FilterMode::Title => state.articles.find_by_title(&keyword).await?,
        FilterMode::All => state.articles.find_by_any(&keyword).await?,
    };
    info!(count = articles.len(), keyword = %keyword, ?mode, "Filtered articles");

    Ok(Json(ArticleListResponse::new(
        format!("Found {} articles matching '{keyword}'", articles.len()),
        articles,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, TokenCodec};
    use crate::models::Article;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn claims() -> Claims {
        Claims {
            user_id: 1,
            email: "amy@example.com".to_string(),
            google_id: "g-1".to_string(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    async fn state_with(articles: &[(i64, &str, &str)]) -> AppState {
        let store = Arc::new(MemoryStore::new());
        for (id, title, content) in articles {
            store
                .insert_article(Article {
                    id: *id,
                    title: title.to_string(),
                    content: content.to_string(),
                    updated: None,
                    deleted: None,
                })
                .await;
        }
        AppState::new(store, TokenCodec::new("test-secret"))
    }

    #[test]
    fn filter_mode_accepts_title_and_all_only() {
        assert_eq!(FilterMode::parse("title"), Some(FilterMode::Title));
        assert_eq!(FilterMode::parse("all"), Some(FilterMode::All));
        assert_eq!(FilterMode::parse("content"), None);
        assert_eq!(FilterMode::parse("Title"), None);
    }

    #[tokio::test]
    async fn get_article_rejects_non_integer_id() {
        let err = get_article(State(state_with(&[]).await), Path("abc".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error, "Invalid ID");
    }

    #[tokio::test]
    async fn get_article_missing_is_404() {
        let err = get_article(State(state_with(&[]).await), Path("7".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Article with ID 7 not found");
    }

    #[tokio::test]
    async fn list_counts_articles() {
        let state = state_with(&[(1, "a", "x"), (2, "b", "y")]).await;
        let Json(body) = list_articles(State(state)).await.unwrap();
        assert_eq!(body.count, 2);
        assert_eq!(body.message, "Successfully retrieved 2 articles");
    }

    #[tokio::test]
    async fn create_validates_fields() {
        let err = create_article(
            Auth(claims()),
            State(state_with(&[]).await),
            Bytes::from_static(br#"{"title":"","content":""}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.message,
            "Validation errors: title is required, content is required"
        );
    }

    #[tokio::test]
    async fn create_returns_201() {
        let (status, Json(body)) = create_article(
            Auth(claims()),
            State(state_with(&[]).await),
            Bytes::from_static(br#"{"title":"New","content":"Body"}"#),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.article.title, "New");
    }

    #[tokio::test]
    async fn update_then_delete() {
        let state = state_with(&[(3, "Old", "text")]).await;
        let Json(updated) = update_article(
            Auth(claims()),
            State(state.clone()),
            Path("3".to_string()),
            Bytes::from_static(br#"{"title":"New","content":"text 2"}"#),
        )
        .await
        .unwrap();
        assert_eq!(updated.article.title, "New");
        assert!(updated.article.updated.is_some());

        delete_article(Auth(claims()), State(state.clone()), Path("3".to_string()))
            .await
            .unwrap();
        let err = get_article(State(state), Path("3".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn filter_dispatches_by_mode() {
        let state = state_with(&[(1, "Rust", "x"), (2, "Other", "about rust")]).await;

        let Json(by_title) = filter_articles(
            State(state.clone()),
            Path(("title".to_string(), "rust".to_string())),
        )
        .await
        .unwrap();
        assert_eq!(by_title.count, 1);

        let Json(by_any) = filter_articles(
            State(state.clone()),
            Path(("all".to_string(), "rust".to_string())),
        )
        .await
        .unwrap();
        assert_eq!(by_any.count, 2);

        let err = filter_articles(State(state), Path(("body".to_string(), "rust".to_string())))
            .await
            .unwrap_err();
        assert_eq!(err.error, "Invalid filter mode");
    }
}
