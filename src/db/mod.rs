//! Database module

mod schema;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite, SqlitePool};

use crate::config::DatabaseConfig;

/// A registered site being tracked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub created_at: DateTime<Utc>,
}

impl Site {
    pub fn new(name: String, domain: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            domain,
            created_at: Utc::now(),
        }
    }
}

/// A single recorded pageview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageviewEvent {
    pub id: Option<i64>,
    pub site_id: String,
    pub session_hash: String,
    pub path: String,
    pub timestamp: DateTime<Utc>,
}

impl PageviewEvent {
    pub fn new(site_id: String, session_hash: String, path: String) -> Self {
        Self {
            id: None,
            site_id,
            session_hash,
            path,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteStats {
    pub visitors: i64,
    pub views: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageStat {
    pub path: String,
    pub views: i64,
}

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", config.url)).await?;
        Ok(Self { pool })
    }

    /// Open the database, run schema setup, and recover from an unreadable
    /// file by moving it aside and starting fresh. The process always comes
    /// up; a damaged database costs data, not availability.
    pub async fn open_or_recover(config: &DatabaseConfig) -> Result<Self> {
        match Self::open(config).await {
            Ok(db) => Ok(db),
            Err(e) => {
                let quarantine = format!("{}.corrupt", config.url);
                tracing::warn!(
                    "Failed to open database at {} ({}), moving it to {} and starting empty",
                    config.url,
                    e,
                    quarantine
                );
                let _ = std::fs::rename(&config.url, &quarantine);
                Self::open(config).await
            }
        }
    }

    async fn open(config: &DatabaseConfig) -> Result<Self> {
        let db = Self::new(config).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&self.pool)
            .await?;
        // FULL so a committed insert is on disk before the HTTP response
        sqlx::query("PRAGMA synchronous=FULL")
            .execute(&self.pool)
            .await?;

        sqlx::query(schema::CREATE_SITES_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(schema::CREATE_EVENTS_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(schema::CREATE_INDEX_SITE_SESSION)
            .execute(&self.pool)
            .await?;
        sqlx::query(schema::CREATE_INDEX_SITE_TIMESTAMP)
            .execute(&self.pool)
            .await?;
        sqlx::query(schema::CREATE_INDEX_SITE_PATH)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_site(&self, site: &Site) -> Result<()> {
        sqlx::query("INSERT INTO sites (id, name, domain, created_at) VALUES (?, ?, ?, ?)")
            .bind(&site.id)
            .bind(&site.name)
            .bind(&site.domain)
            .bind(site.created_at.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_sites(&self) -> Result<Vec<Site>> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
            "SELECT id, name, domain, created_at FROM sites ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, domain, created_at)| Site {
                id,
                name,
                domain,
                created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
            })
            .collect())
    }

    pub async fn insert_event(&self, event: &PageviewEvent) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO events (site_id, session_hash, path, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(&event.site_id)
        .bind(&event.session_hash)
        .bind(&event.path)
        .bind(event.timestamp.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_site_stats(&self, site_id: &str) -> Result<SiteStats> {
        let row: (i64, i64) = sqlx::query_as(
            "SELECT COUNT(DISTINCT session_hash), COUNT(*) FROM events WHERE site_id = ?",
        )
        .bind(site_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(SiteStats {
            visitors: row.0,
            views: row.1,
        })
    }

    /// Pageview counts for the 30 most recent days with data, oldest first
    pub async fn get_timeseries(&self, site_id: &str) -> Result<Vec<DayCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT date, count FROM (
                SELECT date(timestamp / 1000, 'unixepoch') AS date, COUNT(*) AS count
                FROM events
                WHERE site_id = ?
                GROUP BY date
                ORDER BY date DESC
                LIMIT 30
            )
            ORDER BY date ASC
            "#,
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(date, count)| DayCount { date, count })
            .collect())
    }

    pub async fn get_top_pages(&self, site_id: &str, limit: i32) -> Result<Vec<PageStat>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT path, COUNT(*) as views
            FROM events
            WHERE site_id = ?
            GROUP BY path
            ORDER BY views DESC
            LIMIT ?
            "#,
        )
        .bind(site_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(path, views)| PageStat { path, views })
            .collect())
    }
}
