use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::PostId;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredPost {
    pub post_id: PostId,
    pub title: String,
    pub body: String,
    pub author: String,
    pub timestamp_ns: i64,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Inserts a post, assigning its id and creation timestamp. The
    /// timestamp is recorded at nanosecond resolution.
    pub async fn insert_post(&self, title: &str, body: &str, author: &str) -> Result<PostId> {
        let timestamp_ns = Utc::now()
            .timestamp_nanos_opt()
            .context("system clock outside representable nanosecond range")?;
        let rec = sqlx::query(
            "INSERT INTO posts (title, body, author, timestamp_ns)
             VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(title)
        .bind(body)
        .bind(author)
        .bind(timestamp_ns)
        .fetch_one(&self.pool)
        .await?;
        Ok(PostId(rec.get::<i64, _>(0)))
    }

    /// Lists all posts, newest first. Ordering is owned by the service;
    /// clients render the sequence as returned.
    pub async fn list_posts(&self) -> Result<Vec<StoredPost>> {
        let rows = sqlx::query(
            "SELECT id, title, body, author, timestamp_ns
             FROM posts
             ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| StoredPost {
                post_id: PostId(row.get::<i64, _>(0)),
                title: row.get::<String, _>(1),
                body: row.get::<String, _>(2),
                author: row.get::<String, _>(3),
                timestamp_ns: row.get::<i64, _>(4),
            })
            .collect())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
