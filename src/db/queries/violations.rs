use sqlx::PgPool;

use crate::db::models::Violation;

pub async fn increment(pool: &PgPool, guild_id: i64, user_id: i64) -> Result<Violation, sqlx::Error> {
    sqlx::query_as::<_, Violation>(
        r#"
        INSERT INTO violations (guild_id, user_id, count)
        VALUES ($1, $2, 1)
        ON CONFLICT (guild_id, user_id)
        DO UPDATE SET count = violations.count + 1, last_violation_at = NOW()
        RETURNING *
        "#
    )
    .bind(guild_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn get(pool: &PgPool, guild_id: i64, user_id: i64) -> Result<Option<Violation>, sqlx::Error> {
    sqlx::query_as::<_, Violation>("SELECT * FROM violations WHERE guild_id = $1 AND user_id = $2")
        .bind(guild_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn clear(pool: &PgPool, guild_id: i64, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM violations WHERE guild_id = $1 AND user_id = $2")
        .bind(guild_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
