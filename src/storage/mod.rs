// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Trait-based access to articles and users with two backends:
//!
//! - [`MySqlStore`]: production backend over a `sqlx` MySQL pool
//! - [`MemoryStore`]: in-process backend for tests and database-less runs
//!
//! ## Query Contract
//!
//! - Soft-deleted articles (`deleted IS NOT NULL`) are invisible everywhere
//! - Every list is ordered by `updated` descending, ties by `id` descending
//! - Keyword filters are literal, case-insensitive substring matches
//! - Every query returns the full row

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

use async_trait::async_trait;

use crate::models::{Article, UserRecord};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StorageError::NotFound("row".to_string()),
            other => StorageError::Database(other.to_string()),
        }
    }
}

/// Article persistence.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// All articles that are not soft-deleted.
    async fn list_active(&self) -> Result<Vec<Article>, StorageError>;

    async fn get_by_id(&self, id: i64) -> Result<Article, StorageError>;

    async fn create(&self, title: &str, content: &str) -> Result<Article, StorageError>;

    /// Replace title and content and bump `updated`.
    async fn update(&self, id: i64, title: &str, content: &str) -> Result<Article, StorageError>;

    /// Mark an article deleted. Already deleted articles are `NotFound`.
    async fn soft_delete(&self, id: i64) -> Result<(), StorageError>;

    async fn find_by_title(&self, keyword: &str) -> Result<Vec<Article>, StorageError>;

    /// Match the keyword against title or content.
    async fn find_by_any(&self, keyword: &str) -> Result<Vec<Article>, StorageError>;

    /// Connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), StorageError>;
}

/// User persistence, keyed by the Google account id.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the user on first sign-in, refresh email/name/picture afterwards.
    async fn upsert_by_external_id(
        &self,
        google_id: &str,
        email: &str,
        name: &str,
        picture: &str,
    ) -> Result<UserRecord, StorageError>;

    async fn get_by_id(&self, id: i64) -> Result<UserRecord, StorageError>;
}
