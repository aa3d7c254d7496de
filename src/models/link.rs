use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ShortLink {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub is_custom: bool,
    pub created_at: i64,
    pub is_active: bool,
}

/// Row handed to storage on creation; `id` and `created_at` are assigned there.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub short_code: String,
    pub original_url: String,
    pub is_custom: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub url: String,
    #[serde(default, alias = "custom_short_code")]
    pub custom_code: Option<String>,
}
