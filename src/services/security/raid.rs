use std::sync::Arc;

use serenity::all::{Context, EditGuild, GuildId, VerificationLevel};
use tracing::warn;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::embeds::ERROR_COLOR;
use crate::constants::security::{RAID_JOIN_THRESHOLD, RAID_JOIN_WINDOW};
use crate::db::queries::guild_settings;
use crate::services::audit_log;

/// Count a join and raise the verification level when the guild is being raided.
/// Returns true when raid protection kicked in.
pub async fn record_join(ctx: &Context, data: &Arc<Data>, guild_id: GuildId) -> Result<bool, Error> {
    let settings = guild_settings::get_or_default(&data.pool, guild_id.get() as i64).await?;
    if !settings.anti_raid_enabled {
        return Ok(false);
    }

    let joins = data.join_window.record(guild_id.get());
    if joins < RAID_JOIN_THRESHOLD {
        return Ok(false);
    }

    data.join_window.clear(&guild_id.get());
    warn!("Raid detected in {}: {} joins", guild_id, joins);

    set_verification(ctx, guild_id, VerificationLevel::Higher, "Raid detected").await?;

    audit_log::log_action(
        ctx,
        data,
        guild_id,
        "Anti-Raid: Mass Join Detected",
        &format!(
            "{} joins in {} seconds",
            joins,
            RAID_JOIN_WINDOW.as_secs()
        ),
        ERROR_COLOR,
        &[("Action", "Verification set to highest".to_string())],
    )
    .await;

    Ok(true)
}

pub async fn set_verification(
    ctx: &Context,
    guild_id: GuildId,
    level: VerificationLevel,
    reason: &str,
) -> Result<(), Error> {
    guild_id
        .edit(
            ctx,
            EditGuild::new().verification_level(level).audit_log_reason(reason),
        )
        .await?;
    Ok(())
}
