use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::AltDetection;

#[allow(clippy::too_many_arguments)]
pub async fn record(
    pool: &PgPool,
    guild_id: i64,
    user_id: i64,
    score: i32,
    level: &str,
    reasons: &[String],
    matched_user_id: Option<i64>,
    action: &str,
) -> Result<AltDetection, sqlx::Error> {
    sqlx::query_as::<_, AltDetection>(
        r#"
        INSERT INTO alt_detections (id, guild_id, user_id, score, level, reasons, matched_user_id, action)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#
    )
    .bind(Uuid::new_v4())
    .bind(guild_id)
    .bind(user_id)
    .bind(score)
    .bind(level)
    .bind(reasons)
    .bind(matched_user_id)
    .bind(action)
    .fetch_one(pool)
    .await
}
