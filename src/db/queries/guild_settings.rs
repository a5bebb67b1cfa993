use sqlx::PgPool;

use crate::db::models::{GuildSettings, SettingsToggle};

/// Channel and role columns that `/config` can set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsId {
    LogChannel,
    StaffRole,
    UnverifiedRole,
    ProofChannel,
    WelcomeChannel,
    LeaveChannel,
    InviteTrackerChannel,
}

impl SettingsId {
    fn column(&self) -> &'static str {
        match self {
            SettingsId::LogChannel => "log_channel_id",
            SettingsId::StaffRole => "staff_role_id",
            SettingsId::UnverifiedRole => "unverified_role_id",
            SettingsId::ProofChannel => "proof_channel_id",
            SettingsId::WelcomeChannel => "welcome_channel_id",
            SettingsId::LeaveChannel => "leave_channel_id",
            SettingsId::InviteTrackerChannel => "invite_tracker_channel_id",
        }
    }
}

/// Message templates that `/config` can set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsTemplate {
    Welcome,
    Leave,
}

impl SettingsTemplate {
    fn column(&self) -> &'static str {
        match self {
            SettingsTemplate::Welcome => "welcome_message",
            SettingsTemplate::Leave => "leave_message",
        }
    }
}

pub async fn get(pool: &PgPool, guild_id: i64) -> Result<Option<GuildSettings>, sqlx::Error> {
    sqlx::query_as::<_, GuildSettings>("SELECT * FROM guild_settings WHERE guild_id = $1")
        .bind(guild_id)
        .fetch_optional(pool)
        .await
}

/// Get the settings for a guild, falling back to defaults without writing a row
pub async fn get_or_default(pool: &PgPool, guild_id: i64) -> Result<GuildSettings, sqlx::Error> {
    Ok(get(pool, guild_id)
        .await?
        .unwrap_or_else(|| GuildSettings::defaults(guild_id)))
}

pub async fn get_or_create(pool: &PgPool, guild_id: i64) -> Result<GuildSettings, sqlx::Error> {
    if let Some(settings) = get(pool, guild_id).await? {
        return Ok(settings);
    }

    sqlx::query_as::<_, GuildSettings>(
        r#"
        INSERT INTO guild_settings (guild_id)
        VALUES ($1)
        ON CONFLICT (guild_id) DO UPDATE SET updated_at = guild_settings.updated_at
        RETURNING *
        "#
    )
    .bind(guild_id)
    .fetch_one(pool)
    .await
}

pub async fn set_id(
    pool: &PgPool,
    guild_id: i64,
    setting: SettingsId,
    value: Option<i64>,
) -> Result<GuildSettings, sqlx::Error> {
    get_or_create(pool, guild_id).await?;

    // Column names come from a closed enum, never from user input
    let query = format!(
        "UPDATE guild_settings SET {} = $2, updated_at = NOW() WHERE guild_id = $1 RETURNING *",
        setting.column()
    );

    sqlx::query_as::<_, GuildSettings>(&query)
        .bind(guild_id)
        .bind(value)
        .fetch_one(pool)
        .await
}

pub async fn set_template(
    pool: &PgPool,
    guild_id: i64,
    template: SettingsTemplate,
    value: Option<&str>,
) -> Result<GuildSettings, sqlx::Error> {
    get_or_create(pool, guild_id).await?;

    let query = format!(
        "UPDATE guild_settings SET {} = $2, updated_at = NOW() WHERE guild_id = $1 RETURNING *",
        template.column()
    );

    sqlx::query_as::<_, GuildSettings>(&query)
        .bind(guild_id)
        .bind(value)
        .fetch_one(pool)
        .await
}

pub async fn set_toggle(
    pool: &PgPool,
    guild_id: i64,
    toggle: SettingsToggle,
    enabled: bool,
) -> Result<GuildSettings, sqlx::Error> {
    get_or_create(pool, guild_id).await?;

    let query = format!(
        "UPDATE guild_settings SET {} = $2, updated_at = NOW() WHERE guild_id = $1 RETURNING *",
        toggle.column()
    );

    sqlx::query_as::<_, GuildSettings>(&query)
        .bind(guild_id)
        .bind(enabled)
        .fetch_one(pool)
        .await
}
