// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! MySQL storage backend.
//!
//! Tables are created on startup when missing:
//!
//! ```sql
//! article (id, title, content, updated, deleted)
//! users   (id, google_id UNIQUE, email, name, picture, created_at, updated_at)
//! ```

use async_trait::async_trait;
use sqlx::{
    mysql::{MySqlPoolOptions, MySqlRow},
    MySqlPool, Row,
};
use tracing::{error, info};

use super::{ArticleStore, StorageError, UserStore};
use crate::config::DatabaseConfig;
use crate::models::{Article, UserRecord};

const ARTICLE_COLUMNS: &str = "id, title, content, updated, deleted";
const USER_COLUMNS: &str = "id, google_id, email, name, picture, created_at, updated_at";

const MIGRATIONS: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS article (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        content TEXT NOT NULL,
        updated TIMESTAMP NULL DEFAULT NULL,
        deleted TIMESTAMP NULL DEFAULT NULL,
        INDEX idx_article_updated (updated)
    ) DEFAULT CHARSET = utf8mb4
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        google_id VARCHAR(255) NOT NULL UNIQUE,
        email VARCHAR(255) NOT NULL,
        name VARCHAR(255) NOT NULL DEFAULT '',
        picture VARCHAR(1024) NOT NULL DEFAULT '',
        created_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP
    ) DEFAULT CHARSET = utf8mb4
    "#,
];

#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Connect, verify the connection and create missing tables.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| StorageError::Database(format!("failed to connect: {e}")))?;

        info!(host = %config.host, database = %config.name, "Connected to MySQL");

        let store = Self::from_pool(pool);
        store.run_migrations().await?;
        Ok(store)
    }

    /// Wrap an existing pool without touching the schema.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await.map_err(|e| {
                error!(error = %e, "Schema bootstrap failed");
                StorageError::Database(e.to_string())
            })?;
        }
        info!("Database schema ready");
        Ok(())
    }

    async fn select_articles(
        &self,
        filter: &str,
        binds: &[&str],
    ) -> Result<Vec<Article>, StorageError> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM article WHERE deleted IS NULL{filter} \
             ORDER BY updated DESC, id DESC"
        );
        let mut query = sqlx::query(&sql);
        for value in binds {
            query = query.bind(*value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(article_from_row).collect()
    }

    async fn user_by_google_id(&self, google_id: &str) -> Result<UserRecord, StorageError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE google_id = ?"))
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("User {google_id}")))?;
        user_from_row(&row)
    }
}

/// `%keyword%` with LIKE metacharacters escaped.
pub(crate) fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn article_from_row(row: &MySqlRow) -> Result<Article, StorageError> {
    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        updated: row.try_get("updated")?,
        deleted: row.try_get("deleted")?,
    })
}

fn user_from_row(row: &MySqlRow) -> Result<UserRecord, StorageError> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        google_id: row.try_get("google_id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        picture: row.try_get("picture")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ArticleStore for MySqlStore {
    async fn list_active(&self) -> Result<Vec<Article>, StorageError> {
        let articles = self.select_articles("", &[]).await?;
        info!(count = articles.len(), "Retrieved articles");
        Ok(articles)
    }

    async fn get_by_id(&self, id: i64) -> Result<Article, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM article WHERE id = ? AND deleted IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StorageError::NotFound(format!("Article {id}")))?;
        article_from_row(&row)
    }

    async fn create(&self, title: &str, content: &str) -> Result<Article, StorageError> {
        let result = sqlx::query("INSERT INTO article (title, content, updated) VALUES (?, ?, NOW())")
            .bind(title)
            .bind(content)
            .execute(&self.pool)
            .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|e| StorageError::Database(format!("insert id out of range: {e}")))?;
        info!(id, "Created article");
        ArticleStore::get_by_id(self, id).await
    }

    async fn update(&self, id: i64, title: &str, content: &str) -> Result<Article, StorageError> {
        // rows_affected() only counts changed rows on MySQL, so re-read instead.
        sqlx::query(
            "UPDATE article SET title = ?, content = ?, updated = NOW() \
             WHERE id = ? AND deleted IS NULL",
        )
        .bind(title)
        .bind(content)
        .bind(id)
        .execute(&self.pool)
        .await?;

        ArticleStore::get_by_id(self, id).await
    }

    async fn soft_delete(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE article SET deleted = NOW() WHERE id = ? AND deleted IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Article {id}")));
        }
        info!(id, "Soft-deleted article");
        Ok(())
    }

    async fn find_by_title(&self, keyword: &str) -> Result<Vec<Article>, StorageError> {
        let pattern = like_pattern(keyword);
        self.select_articles(" AND title LIKE ?", &[&pattern]).await
    }

    async fn find_by_any(&self, keyword: &str) -> Result<Vec<Article>, StorageError> {
        let pattern = like_pattern(keyword);
        self.select_articles(" AND (title LIKE ? OR content LIKE ?)", &[&pattern, &pattern])
            .await
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MySqlStore {
    async fn upsert_by_external_id(
        &self,
        google_id: &str,
        email: &str,
        name: &str,
        picture: &str,
    ) -> Result<UserRecord, StorageError> {
        sqlx::query(
            "INSERT INTO users (google_id, email, name, picture, created_at, updated_at) \
             VALUES (?, ?, ?, ?, NOW(), NOW()) \
             ON DUPLICATE KEY UPDATE email = VALUES(email), name = VALUES(name), \
             picture = VALUES(picture), updated_at = NOW()",
        )
        .bind(google_id)
        .bind(email)
        .bind(name)
        .bind(picture)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to upsert user");
            StorageError::from(e)
        })?;

        let user = self.user_by_google_id(google_id).await?;
        info!(user_id = user.id, "Stored user");
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> Result<UserRecord, StorageError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("User {id}")))?;
        user_from_row(&row)
    }
}
