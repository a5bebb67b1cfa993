use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{InviteJoin, InviteSnapshot};

pub async fn snapshot(pool: &PgPool, guild_id: i64) -> Result<Vec<InviteSnapshot>, sqlx::Error> {
    sqlx::query_as::<_, InviteSnapshot>("SELECT * FROM invites WHERE guild_id = $1")
        .bind(guild_id)
        .fetch_all(pool)
        .await
}

/// Replace the stored invite snapshot for a guild
pub async fn replace_snapshot(
    pool: &PgPool,
    guild_id: i64,
    invites: &[InviteSnapshot],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM invites WHERE guild_id = $1")
        .bind(guild_id)
        .execute(&mut *tx)
        .await?;

    for invite in invites {
        sqlx::query(
            r#"
            INSERT INTO invites (guild_id, code, inviter_id, uses)
            VALUES ($1, $2, $3, $4)
            "#
        )
        .bind(guild_id)
        .bind(&invite.code)
        .bind(invite.inviter_id)
        .bind(invite.uses)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

pub async fn record_join(
    pool: &PgPool,
    guild_id: i64,
    user_id: i64,
    inviter_id: Option<i64>,
    invite_code: &str,
) -> Result<InviteJoin, sqlx::Error> {
    sqlx::query_as::<_, InviteJoin>(
        r#"
        INSERT INTO invite_joins (id, guild_id, user_id, inviter_id, invite_code)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#
    )
    .bind(Uuid::new_v4())
    .bind(guild_id)
    .bind(user_id)
    .bind(inviter_id)
    .bind(invite_code)
    .fetch_one(pool)
    .await
}

pub async fn count_by_inviter(
    pool: &PgPool,
    guild_id: i64,
    inviter_id: i64,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM invite_joins WHERE guild_id = $1 AND inviter_id = $2"
    )
    .bind(guild_id)
    .bind(inviter_id)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

/// Most recent recorded join for a user
pub async fn latest_join(
    pool: &PgPool,
    guild_id: i64,
    user_id: i64,
) -> Result<Option<InviteJoin>, sqlx::Error> {
    sqlx::query_as::<_, InviteJoin>(
        r#"
        SELECT * FROM invite_joins
        WHERE guild_id = $1 AND user_id = $2
        ORDER BY joined_at DESC
        LIMIT 1
        "#
    )
    .bind(guild_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
