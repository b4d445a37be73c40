// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory storage backend.
//!
//! Used by tests and by `STORAGE_BACKEND=memory`. Data is lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use super::{ArticleStore, StorageError, UserStore};
use crate::models::{Article, UserRecord};

#[derive(Debug, Default)]
struct Tables {
    articles: BTreeMap<i64, Article>,
    users: BTreeMap<i64, UserRecord>,
    next_article_id: i64,
    next_user_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an article as-is, keeping its id and timestamps.
    pub async fn insert_article(&self, article: Article) {
        let mut tables = self.tables.write().await;
        tables.next_article_id = tables.next_article_id.max(article.id);
        tables.articles.insert(article.id, article);
    }

    async fn select<F>(&self, keep: F) -> Vec<Article>
    where
        F: Fn(&Article) -> bool,
    {
        let tables = self.tables.read().await;
        let mut found: Vec<Article> = tables
            .articles
            .values()
            .filter(|a| a.deleted.is_none() && keep(a))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated.cmp(&a.updated).then(b.id.cmp(&a.id)));
        found
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn list_active(&self) -> Result<Vec<Article>, StorageError> {
        Ok(self.select(|_| true).await)
    }

    async fn get_by_id(&self, id: i64) -> Result<Article, StorageError> {
        let tables = self.tables.read().await;
        tables
            .articles
            .get(&id)
            .filter(|a| a.deleted.is_none())
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("Article {id}")))
    }

    async fn create(&self, title: &str, content: &str) -> Result<Article, StorageError> {
        let mut tables = self.tables.write().await;
        tables.next_article_id += 1;
        let article = Article {
            id: tables.next_article_id,
            title: title.to_string(),
            content: content.to_string(),
            updated: Some(Utc::now()),
            deleted: None,
        };
        tables.articles.insert(article.id, article.clone());
        info!(id = article.id, "Created article");
        Ok(article)
    }

    async fn update(&self, id: i64, title: &str, content: &str) -> Result<Article, StorageError> {
        let mut tables = self.tables.write().await;
        let article = tables
            .articles
            .get_mut(&id)
            .filter(|a| a.deleted.is_none())
            .ok_or_else(|| StorageError::NotFound(format!("Article {id}")))?;

        article.title = title.to_string();
        article.content = content.to_string();
        article.updated = Some(Utc::now());
        Ok(article.clone())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let article = tables
            .articles
            .get_mut(&id)
            .filter(|a| a.deleted.is_none())
            .ok_or_else(|| StorageError::NotFound(format!("Article {id}")))?;

        article.deleted = Some(Utc::now());
        info!(id, "Soft-deleted article");
        Ok(())
    }

    async fn find_by_title(&self, keyword: &str) -> Result<Vec<Article>, StorageError> {
        Ok(self.select(|a| contains_ignore_case(&a.title, keyword)).await)
    }

    async fn find_by_any(&self, keyword: &str) -> Result<Vec<Article>, StorageError> {
        Ok(self
            .select(|a| {
                contains_ignore_case(&a.title, keyword) || contains_ignore_case(&a.content, keyword)
            })
            .await)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn upsert_by_external_id(
        &self,
        google_id: &str,
        email: &str,
        name: &str,
        picture: &str,
    ) -> Result<UserRecord, StorageError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if let Some(user) = tables.users.values_mut().find(|u| u.google_id == google_id) {
            user.email = email.to_string();
            user.name = name.to_string();
            user.picture = picture.to_string();
            user.updated_at = Some(now);
            info!(user_id = user.id, "Updated user");
            return Ok(user.clone());
        }

        tables.next_user_id += 1;
        let user = UserRecord {
            id: tables.next_user_id,
            google_id: google_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            picture: picture.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        tables.users.insert(user.id, user.clone());
        info!(user_id = user.id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> Result<UserRecord, StorageError> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("User {id}")))
    }
}
