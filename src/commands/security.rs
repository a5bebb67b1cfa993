use poise::serenity_prelude::VerificationLevel;
use poise::CreateReply;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::commands::checks::owner_or_admin;
use crate::constants::embeds::{self, SUCCESS_COLOR, WARNING_COLOR};
use crate::db::models::SettingsToggle;
use crate::db::queries::guild_settings;
use crate::services::audit_log;
use crate::services::community::invites;
use crate::services::security::raid;
use crate::utils::formatting::mention_user;

#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum Switch {
    #[name = "on"]
    On,
    #[name = "off"]
    Off,
}

impl Switch {
    pub fn enabled(self) -> bool {
        self == Switch::On
    }
}

async fn apply(ctx: Context<'_>, toggle: SettingsToggle, switch: Switch, extra: Option<&str>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let enabled = switch.enabled();

    guild_settings::set_toggle(&ctx.data().pool, guild_id.get() as i64, toggle, enabled).await?;

    let mut text = if enabled {
        format!("✅ {} enabled", toggle.label())
    } else {
        format!("⚠️ {} disabled", toggle.label())
    };
    if let Some(extra) = extra {
        text.push_str(". ");
        text.push_str(extra);
    }

    let color = if enabled { SUCCESS_COLOR } else { WARNING_COLOR };
    ctx.send(CreateReply::default().embed(embeds::standard_embed().description(&text).color(color)))
        .await?;

    audit_log::log_action(
        ctx.serenity_context(),
        ctx.data(),
        guild_id,
        &format!("{} {}", toggle.label(), if enabled { "enabled" } else { "disabled" }),
        &format!("Moderator: {}", mention_user(ctx.author().id)),
        color,
        &[],
    )
    .await;

    Ok(())
}

/// Turn auto-moderation on or off
#[poise::command(prefix_command, slash_command, guild_only, check = "owner_or_admin")]
pub async fn automod(ctx: Context<'_>, #[description = "on or off"] mode: Switch) -> Result<(), Error> {
    apply(ctx, SettingsToggle::Automod, mode, None).await
}

/// Turn raid protection on or off. Also raises or lowers the verification level
#[poise::command(prefix_command, slash_command, guild_only, check = "owner_or_admin")]
pub async fn antiraid(ctx: Context<'_>, #[description = "on or off"] mode: Switch) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let (level, note) = if mode.enabled() {
        (VerificationLevel::Higher, "Verification set to highest")
    } else {
        (VerificationLevel::Low, "Verification restored")
    };
    raid::set_verification(ctx.serenity_context(), guild_id, level, "Anti-raid toggled").await?;

    apply(ctx, SettingsToggle::AntiRaid, mode, Some(note)).await
}

/// Turn anti-nuke protection on or off
#[poise::command(prefix_command, slash_command, guild_only, check = "owner_or_admin")]
pub async fn antinuke(ctx: Context<'_>, #[description = "on or off"] mode: Switch) -> Result<(), Error> {
    apply(ctx, SettingsToggle::AntiNuke, mode, None).await
}

/// Turn invite tracking on or off
#[poise::command(prefix_command, slash_command, guild_only, check = "owner_or_admin")]
pub async fn invitetracking(ctx: Context<'_>, #[description = "on or off"] mode: Switch) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    if mode.enabled() {
        let cached = invites::refresh(ctx.serenity_context(), ctx.data(), guild_id).await?;
        let note = format!("Cached {} invites", cached);
        return apply(ctx, SettingsToggle::InviteTracking, mode, Some(&note)).await;
    }

    apply(ctx, SettingsToggle::InviteTracking, mode, None).await
}
