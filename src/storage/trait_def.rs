use crate::models::{ClickEvent, NewClickEvent, NewShortLink, ShortLink};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short code already exists")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables and indexes)
    async fn init(&self) -> Result<()>;

    /// Close the underlying connection pool
    async fn close(&self);

    /// Get a short link by exact code, regardless of its active flag
    async fn find_by_code(&self, short_code: &str) -> Result<Option<ShortLink>>;

    /// Insert a new short link inside a transaction.
    ///
    /// Returns `StorageError::Conflict` when the unique constraint on
    /// `short_code` rejects the row; nothing is left behind on any failure.
    async fn insert_link(&self, link: &NewShortLink) -> StorageResult<ShortLink>;

    /// Set the active flag, returning the number of rows matched
    async fn set_active(&self, short_code: &str, is_active: bool) -> Result<u64>;

    /// Append a click event
    async fn insert_click(&self, event: &NewClickEvent) -> Result<()>;

    /// Count every click recorded for a code
    async fn count_clicks(&self, short_code: &str) -> Result<i64>;

    /// List the newest `limit` clicks (all when `None`), oldest first.
    /// Ties on timestamp are ordered by insertion.
    async fn list_clicks(&self, short_code: &str, limit: Option<i64>) -> Result<Vec<ClickEvent>>;

    /// Count clicks per UTC calendar day (`YYYY-MM-DD`) for
    /// `since <= timestamp < until`, ascending by day
    async fn daily_click_counts(
        &self,
        short_code: &str,
        since: i64,
        until: i64,
    ) -> Result<Vec<(String, i64)>>;
}
