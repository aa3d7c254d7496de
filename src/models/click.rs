use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A recorded redirect. Never updated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClickEvent {
    pub id: i64,
    pub short_code: String,
    pub ip_address: String,
    pub user_agent: String,
    pub referer: Option<String>,
    /// Unix timestamp (seconds)
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct NewClickEvent {
    pub short_code: String,
    pub ip_address: String,
    pub user_agent: String,
    pub referer: Option<String>,
    pub timestamp: i64,
}
