use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

const MIGRATIONS: &[(&str, &str)] = &[
    ("001_guild_settings", include_str!("../../migrations/001_guild_settings.sql")),
    ("002_user_lists", include_str!("../../migrations/002_user_lists.sql")),
    ("003_moderation", include_str!("../../migrations/003_moderation.sql")),
    ("004_tickets", include_str!("../../migrations/004_tickets.sql")),
    ("005_invites", include_str!("../../migrations/005_invites.sql")),
    ("006_alt_detections", include_str!("../../migrations/006_alt_detections.sql")),
];

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    info!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("Database connection established");

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    for (name, migration) in MIGRATIONS {
        info!("Running migration {}", name);
        for statement in split_statements(migration) {
            // Migrations are re-run on every start; existing objects are fine
            if let Err(e) = sqlx::query(statement).execute(pool).await {
                let err_str = e.to_string();
                if !err_str.contains("already exists") && !err_str.contains("duplicate key") {
                    return Err(e);
                }
            }
        }
    }

    info!("Migrations completed successfully");
    Ok(())
}

/// Split a migration file into its non-empty statements
fn split_statements(migration: &str) -> impl Iterator<Item = &str> {
    migration
        .split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_statements_skips_blanks() {
        let sql = "CREATE TABLE a (x INT);\n\n  ;CREATE INDEX i ON a (x);\n";
        let statements: Vec<_> = split_statements(sql).collect();
        assert_eq!(statements, vec!["CREATE TABLE a (x INT)", "CREATE INDEX i ON a (x)"]);
    }

    #[test]
    fn test_every_migration_has_statements() {
        for (name, migration) in MIGRATIONS {
            assert!(split_statements(migration).count() > 0, "{} is empty", name);
        }
    }
}
