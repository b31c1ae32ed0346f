use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::{domain::TechnologistEntry, protocol::JoinSubmission};

/// Server-side persistence: the public member roster and accepted join
/// submissions.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredMember {
    pub member_id: i64,
    pub name: String,
    pub role: String,
    pub region: String,
    pub location: String,
    pub link: String,
    pub sort_order: i64,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredSubmission {
    pub submission_id: i64,
    pub name: String,
    pub location: String,
    pub website: String,
    pub focuses: Vec<String>,
    pub focus_suggested: Option<String>,
    pub title: Option<String>,
    pub years_experience: String,
    pub created_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = open_pool(database_url).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                member_id   INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                role        TEXT NOT NULL,
                region      TEXT NOT NULL,
                location    TEXT NOT NULL,
                link        TEXT NOT NULL,
                sort_order  INTEGER NOT NULL DEFAULT 0,
                featured    INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to ensure members table exists")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS join_submissions (
                submission_id    INTEGER PRIMARY KEY AUTOINCREMENT,
                name             TEXT NOT NULL,
                location         TEXT NOT NULL,
                website          TEXT NOT NULL,
                focuses          TEXT NOT NULL,
                focus_suggested  TEXT,
                title            TEXT,
                years_experience TEXT NOT NULL,
                created_at       TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to ensure join_submissions table exists")?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn insert_member(&self, entry: &TechnologistEntry) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO members (name, role, region, location, link, sort_order, featured)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.name)
        .bind(&entry.role)
        .bind(&entry.region)
        .bind(&entry.location)
        .bind(entry.link.as_str())
        .bind(entry.order)
        .bind(entry.featured)
        .execute(&self.pool)
        .await
        .context("failed to insert member")?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_members(&self) -> Result<Vec<StoredMember>> {
        let rows = sqlx::query(
            r#"
            SELECT member_id, name, role, region, location, link, sort_order, featured, created_at
            FROM members
            ORDER BY member_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list members")?;

        let mut members = Vec::with_capacity(rows.len());
        for row in rows {
            members.push(StoredMember {
                member_id: row.try_get("member_id")?,
                name: row.try_get("name")?,
                role: row.try_get("role")?,
                region: row.try_get("region")?,
                location: row.try_get("location")?,
                link: row.try_get("link")?,
                sort_order: row.try_get("sort_order")?,
                featured: row.try_get("featured")?,
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(members)
    }

    pub async fn count_members(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await
            .context("failed to count members")
    }

    pub async fn insert_join_submission(&self, submission: &JoinSubmission) -> Result<i64> {
        let focuses = serde_json::to_string(&submission.focuses)
            .context("failed to encode submission focuses")?;
        let result = sqlx::query(
            r#"
            INSERT INTO join_submissions
                (name, location, website, focuses, focus_suggested, title, years_experience)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&submission.name)
        .bind(&submission.location)
        .bind(&submission.website)
        .bind(focuses)
        .bind(&submission.focus_suggested)
        .bind(&submission.title)
        .bind(&submission.years_experience)
        .execute(&self.pool)
        .await
        .context("failed to insert join submission")?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_join_submissions(&self) -> Result<Vec<StoredSubmission>> {
        let rows = sqlx::query(
            r#"
            SELECT submission_id, name, location, website, focuses, focus_suggested,
                   title, years_experience, created_at
            FROM join_submissions
            ORDER BY submission_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list join submissions")?;

        let mut submissions = Vec::with_capacity(rows.len());
        for row in rows {
            let focuses_raw: String = row.try_get("focuses")?;
            let focuses: Vec<String> = serde_json::from_str(&focuses_raw)
                .context("failed to decode submission focuses")?;
            submissions.push(StoredSubmission {
                submission_id: row.try_get("submission_id")?,
                name: row.try_get("name")?,
                location: row.try_get("location")?,
                website: row.try_get("website")?,
                focuses,
                focus_suggested: row.try_get("focus_suggested")?,
                title: row.try_get("title")?,
                years_experience: row.try_get("years_experience")?,
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(submissions)
    }
}

/// Client-side persistence of in-progress join wizard answers, keyed by
/// field name. Lives in its own database file so wiping a draft never
/// touches roster data.
#[derive(Clone)]
pub struct DraftStore {
    pool: Pool<Sqlite>,
}

impl DraftStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = open_pool(database_url).await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS form_draft (
                field      TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to ensure form_draft table exists")?;
        Ok(Self { pool })
    }

    pub async fn get_item(&self, field: &str) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT value FROM form_draft WHERE field = ?")
            .bind(field)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read draft field '{field}'"))
    }

    pub async fn set_item(&self, field: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO form_draft (field, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(field) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(field)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write draft field '{field}'"))?;
        Ok(())
    }

    pub async fn remove_item(&self, field: &str) -> Result<()> {
        sqlx::query("DELETE FROM form_draft WHERE field = ?")
            .bind(field)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to remove draft field '{field}'"))?;
        Ok(())
    }
}

async fn open_pool(database_url: &str) -> Result<Pool<Sqlite>> {
    ensure_sqlite_parent_dir_exists(database_url)?;
    let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .with_context(|| format!("failed to open sqlite database '{database_url}'"))
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
    })
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
