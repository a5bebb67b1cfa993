use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Violation {
    pub guild_id: i64,
    pub user_id: i64,
    pub count: i32,
    pub last_violation_at: DateTime<Utc>,
}
