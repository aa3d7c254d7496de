use crate::models::{ClickEvent, NewClickEvent, NewShortLink, ShortLink};
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS short_links (
                id BIGSERIAL PRIMARY KEY,
                short_code TEXT NOT NULL UNIQUE,
                original_url TEXT NOT NULL,
                is_custom BOOLEAN NOT NULL DEFAULT FALSE,
                created_at BIGINT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_short_code_active ON short_links(short_code, is_active)",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS click_events (
                id BIGSERIAL PRIMARY KEY,
                short_code TEXT NOT NULL,
                ip_address TEXT NOT NULL,
                user_agent TEXT NOT NULL,
                referer TEXT,
                timestamp BIGINT NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_click_code_timestamp ON click_events(short_code, timestamp)",
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<ShortLink>> {
        let link = sqlx::query_as::<_, ShortLink>(
            r#"
            SELECT id, short_code, original_url, is_custom, created_at, is_active
            FROM short_links
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn insert_link(&self, link: &NewShortLink) -> StorageResult<ShortLink> {
        let created_at = chrono::Utc::now().timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Other(e.into()))?;

        let inserted = sqlx::query_as::<_, ShortLink>(
            r#"
            INSERT INTO short_links (short_code, original_url, is_custom, created_at, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (short_code) DO NOTHING
            RETURNING id, short_code, original_url, is_custom, created_at, is_active
            "#,
        )
        .bind(&link.short_code)
        .bind(&link.original_url)
        .bind(link.is_custom)
        .bind(created_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        let Some(row) = inserted else {
            return Err(StorageError::Conflict);
        };

        tx.commit()
            .await
            .map_err(|e| StorageError::Other(e.into()))?;

        Ok(row)
    }

    async fn set_active(&self, short_code: &str, is_active: bool) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET is_active = $1
            WHERE short_code = $2
            "#,
        )
        .bind(is_active)
        .bind(short_code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_click(&self, event: &NewClickEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO click_events (short_code, ip_address, user_agent, referer, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&event.short_code)
        .bind(&event.ip_address)
        .bind(&event.user_agent)
        .bind(event.referer.as_deref())
        .bind(event.timestamp)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn count_clicks(&self, short_code: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM click_events WHERE short_code = $1",
        )
        .bind(short_code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn list_clicks(&self, short_code: &str, limit: Option<i64>) -> Result<Vec<ClickEvent>> {
        // LIMIT NULL is LIMIT ALL in PostgreSQL
        let clicks = sqlx::query_as::<_, ClickEvent>(
            r#"
            SELECT id, short_code, ip_address, user_agent, referer, timestamp
            FROM (
                SELECT id, short_code, ip_address, user_agent, referer, timestamp
                FROM click_events
                WHERE short_code = $1
                ORDER BY timestamp DESC, id DESC
                LIMIT $2
            ) AS recent
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(short_code)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(clicks)
    }

    async fn daily_click_counts(
        &self,
        short_code: &str,
        since: i64,
        until: i64,
    ) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT to_char(to_timestamp(timestamp) AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day,
                   COUNT(*) AS clicks
            FROM click_events
            WHERE short_code = $1 AND timestamp >= $2 AND timestamp < $3
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(short_code)
        .bind(since)
        .bind(until)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }
}
