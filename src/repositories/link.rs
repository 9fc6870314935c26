// src/repositories/link.rs - Data access
use async_trait::async_trait;
use log::{debug, error};
use sqlx::PgPool;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::{Link, NewLink};

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepositoryTrait: Send + Sync {
    /// Inserts a new link
    ///
    /// ### Errors
    /// * `RepositoryError::Conflict` - If the key is already taken; the store's
    ///   uniqueness constraint is the authority here, not an earlier lookup
    /// * `RepositoryError::Database` - If any other database error occurs
    async fn insert(&self, link: &NewLink) -> Result<Link>;

    /// Finds the canonical (oldest) link for an exact URL match
    async fn find_by_url(&self, url: &str) -> Result<Option<Link>>;

    /// Finds the oldest link for `url` held by any key other than `key`
    async fn find_by_url_excluding(&self, url: &str, key: &str) -> Result<Option<Link>>;

    /// Finds a link by its exact key
    async fn find_by_key(&self, key: &str) -> Result<Option<Link>>;

    /// Lists links, newest first
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Link>>;

    /// Total number of stored links
    async fn count(&self) -> Result<i64>;

    /// Points an existing key at a new URL
    ///
    /// ### Returns
    /// * `Result<u64>` - number of rows affected, `0` when the key is unknown
    async fn update_url(&self, key: &str, url: &str) -> Result<u64>;

    /// Atomically bumps the click counter and returns the updated link
    async fn increment_clicks(&self, key: &str) -> Result<Option<Link>>;

    /// Deletes a link by key
    ///
    /// ### Returns
    /// * `Result<bool>` - whether a row was actually removed
    async fn delete(&self, key: &str) -> Result<bool>;
}

// Implementation using actual database
pub struct LinkRepository {
    pool: PgPool,
}

impl LinkRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl LinkRepositoryTrait for LinkRepository {
    async fn insert(&self, link: &NewLink) -> Result<Link> {
        sqlx::query_as::<_, Link>(
            r#"
            INSERT INTO links (key, url, created_at, clicks)
            VALUES ($1, $2, $3, 0)
            RETURNING key, url, created_at, clicks
            "#,
        )
        .bind(&link.key)
        .bind(&link.url)
        .bind(link.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = RepositoryError::from(e);
            if !err.is_unique_violation() {
                error!("Failed to insert link '{}': {}", link.key, err);
            }
            err
        })
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Link>> {
        sqlx::query_as::<_, Link>(
            r#"
            SELECT key, url, created_at, clicks
            FROM links
            WHERE url = $1
            ORDER BY created_at ASC, key ASC
            LIMIT 1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }

    async fn find_by_url_excluding(&self, url: &str, key: &str) -> Result<Option<Link>> {
        sqlx::query_as::<_, Link>(
            r#"
            SELECT key, url, created_at, clicks
            FROM links
            WHERE url = $1 AND key <> $2
            ORDER BY created_at ASC, key ASC
            LIMIT 1
            "#,
        )
        .bind(url)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<Link>> {
        sqlx::query_as::<_, Link>(
            r#"
            SELECT key, url, created_at, clicks
            FROM links
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Link>> {
        let links = sqlx::query_as::<_, Link>(
            r#"
            SELECT key, url, created_at, clicks
            FROM links
            ORDER BY created_at DESC, key ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn count(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn update_url(&self, key: &str, url: &str) -> Result<u64> {
        debug!("Updating link '{}' to point at {}", key, url);

        let result = sqlx::query("UPDATE links SET url = $2 WHERE key = $1")
            .bind(key)
            .bind(url)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn increment_clicks(&self, key: &str) -> Result<Option<Link>> {
        sqlx::query_as::<_, Link>(
            r#"
            UPDATE links
            SET clicks = clicks + 1
            WHERE key = $1
            RETURNING key, url, created_at, clicks
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM links WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
