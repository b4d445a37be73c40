// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API, plus the stored records they
//! wrap. Every success body carries a `message`; single resources are
//! flattened next to it so clients can read the fields directly.
//!
//! ## Model Categories
//!
//! - **Articles**: stored notes, soft-deleted through `deleted`
//! - **Users**: accounts created on first Google sign-in
//! - **Uploads**: metadata of files pushed to Google Drive

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Generic Responses
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Article Models
// =============================================================================

/// A stored article.
///
/// Rows with a non-null `deleted` are soft-deleted and never returned.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Last modification time.
    pub updated: Option<DateTime<Utc>>,
    /// Soft-delete time.
    pub deleted: Option<DateTime<Utc>>,
}

/// Body of `POST /articles` and `PUT /article/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ArticleInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl ArticleInput {
    /// Rule violations, empty when the input is acceptable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("title is required".to_string());
        }
        if self.content.trim().is_empty() {
            errors.push("content is required".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ArticleListResponse {
    pub message: String,
    pub count: usize,
    pub articles: Vec<Article>,
}

impl ArticleListResponse {
    pub fn new(message: impl Into<String>, articles: Vec<Article>) -> Self {
        Self {
            message: message.into(),
            count: articles.len(),
            articles,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ArticleResponse {
    pub message: String,
    #[serde(flatten)]
    pub article: Article,
}

// =============================================================================
// User Models
// =============================================================================

/// Body of `POST /user`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserRegistration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: i64,
}

impl UserRegistration {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("name is required".to_string());
        }
        if self.id <= 0 {
            errors.push("id must be a positive integer".to_string());
        }
        errors
    }
}

/// An account created through Google sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserInfoResponse {
    pub message: String,
    #[serde(flatten)]
    pub user: UserRecord,
}

// =============================================================================
// Upload Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub file_id: String,
    pub name: String,
    pub mime_type: String,
    pub web_view_link: String,
}
