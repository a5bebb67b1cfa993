use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Use count of an invite at the time it was last snapshotted
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct InviteSnapshot {
    pub guild_id: i64,
    pub code: String,
    pub inviter_id: Option<i64>,
    pub uses: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InviteJoin {
    pub id: Uuid,
    pub guild_id: i64,
    pub user_id: i64,
    pub inviter_id: Option<i64>,
    pub invite_code: String,
    pub joined_at: DateTime<Utc>,
}
