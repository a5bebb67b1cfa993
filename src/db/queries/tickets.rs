use sqlx::PgPool;

use crate::db::models::{MmTier, Ticket, TicketKind, TradeDetails};

pub async fn create(
    pool: &PgPool,
    channel_id: i64,
    guild_id: i64,
    owner_id: i64,
    kind: TicketKind,
    tier: Option<MmTier>,
    trade: Option<&TradeDetails>,
) -> Result<Ticket, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        r#"
        INSERT INTO tickets (channel_id, guild_id, owner_id, kind, tier, trader, giving, receiving, both_join, tip)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#
    )
    .bind(channel_id)
    .bind(guild_id)
    .bind(owner_id)
    .bind(kind)
    .bind(tier)
    .bind(trade.map(|t| t.trader.as_str()))
    .bind(trade.map(|t| t.giving.as_str()))
    .bind(trade.map(|t| t.receiving.as_str()))
    .bind(trade.map(|t| t.both_join.as_str()))
    .bind(trade.and_then(|t| t.tip.as_deref()))
    .fetch_one(pool)
    .await
}

pub async fn get(pool: &PgPool, channel_id: i64) -> Result<Option<Ticket>, sqlx::Error> {
    sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE channel_id = $1")
        .bind(channel_id)
        .fetch_optional(pool)
        .await
}

/// Mark a ticket as claimed. Only succeeds if nobody holds it yet
pub async fn claim(
    pool: &PgPool,
    channel_id: i64,
    claimer_id: i64,
) -> Result<Option<Ticket>, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        r#"
        UPDATE tickets SET claimed_by = $2
        WHERE channel_id = $1 AND claimed_by IS NULL
        RETURNING *
        "#
    )
    .bind(channel_id)
    .bind(claimer_id)
    .fetch_optional(pool)
    .await
}

pub async fn unclaim(pool: &PgPool, channel_id: i64) -> Result<Option<Ticket>, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        r#"
        UPDATE tickets SET claimed_by = NULL
        WHERE channel_id = $1 AND claimed_by IS NOT NULL
        RETURNING *
        "#
    )
    .bind(channel_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, channel_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tickets WHERE channel_id = $1")
        .bind(channel_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// (active, claimed) ticket counts for a guild
pub async fn counts(pool: &PgPool, guild_id: i64) -> Result<(i64, i64), sqlx::Error> {
    let row: (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(claimed_by)
        FROM tickets
        WHERE guild_id = $1
        "#
    )
    .bind(guild_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
