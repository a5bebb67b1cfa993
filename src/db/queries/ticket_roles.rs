use sqlx::PgPool;

use crate::db::models::{MmTier, TicketKind};

pub async fn set_kind_role(
    pool: &PgPool,
    guild_id: i64,
    kind: TicketKind,
    role_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO ticket_roles (guild_id, kind, role_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (guild_id, kind) DO UPDATE SET role_id = EXCLUDED.role_id
        "#
    )
    .bind(guild_id)
    .bind(kind)
    .bind(role_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_kind_role(
    pool: &PgPool,
    guild_id: i64,
    kind: TicketKind,
) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT role_id FROM ticket_roles WHERE guild_id = $1 AND kind = $2"
    )
    .bind(guild_id)
    .bind(kind)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.0))
}

pub async fn kind_roles(pool: &PgPool, guild_id: i64) -> Result<Vec<(TicketKind, i64)>, sqlx::Error> {
    sqlx::query_as("SELECT kind, role_id FROM ticket_roles WHERE guild_id = $1 ORDER BY kind")
        .bind(guild_id)
        .fetch_all(pool)
        .await
}

pub async fn set_tier_role(
    pool: &PgPool,
    guild_id: i64,
    tier: MmTier,
    role_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO mm_tier_roles (guild_id, tier, role_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (guild_id, tier) DO UPDATE SET role_id = EXCLUDED.role_id
        "#
    )
    .bind(guild_id)
    .bind(tier)
    .bind(role_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn tier_roles(pool: &PgPool, guild_id: i64) -> Result<Vec<(MmTier, i64)>, sqlx::Error> {
    sqlx::query_as("SELECT tier, role_id FROM mm_tier_roles WHERE guild_id = $1 ORDER BY tier")
        .bind(guild_id)
        .fetch_all(pool)
        .await
}
