use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AltDetection {
    pub id: Uuid,
    pub guild_id: i64,
    pub user_id: i64,
    pub score: i32,
    pub level: String,
    pub reasons: Vec<String>,
    pub matched_user_id: Option<i64>,
    pub action: String,
    pub detected_at: DateTime<Utc>,
}
