use sqlx::PgPool;

use crate::db::models::{ListEntry, UserList};

pub async fn all(pool: &PgPool, list: UserList) -> Result<Vec<ListEntry>, sqlx::Error> {
    let query = format!("SELECT * FROM {} ORDER BY added_at", list.table());

    sqlx::query_as::<_, ListEntry>(&query).fetch_all(pool).await
}

/// Add a user to a list, removing them from the opposite list in the same transaction
pub async fn add(
    pool: &PgPool,
    list: UserList,
    user_id: i64,
    reason: Option<&str>,
    added_by: i64,
) -> Result<ListEntry, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let insert = format!(
        r#"
        INSERT INTO {} (user_id, reason, added_by)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE SET reason = EXCLUDED.reason, added_by = EXCLUDED.added_by
        RETURNING *
        "#,
        list.table()
    );

    let entry = sqlx::query_as::<_, ListEntry>(&insert)
        .bind(user_id)
        .bind(reason)
        .bind(added_by)
        .fetch_one(&mut *tx)
        .await?;

    let remove = format!("DELETE FROM {} WHERE user_id = $1", list.opposite().table());
    sqlx::query(&remove).bind(user_id).execute(&mut *tx).await?;

    tx.commit().await?;

    Ok(entry)
}

/// Remove a user from a list. Returns whether they were on it
pub async fn remove(pool: &PgPool, list: UserList, user_id: i64) -> Result<bool, sqlx::Error> {
    let query = format!("DELETE FROM {} WHERE user_id = $1", list.table());

    let result = sqlx::query(&query).bind(user_id).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}
