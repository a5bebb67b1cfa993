use poise::serenity_prelude::{Channel, Role};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::commands::checks::owner_or_admin;
use crate::constants::embeds;
use crate::db::queries::guild_settings::{self, SettingsId, SettingsTemplate};
use crate::services::community::welcome::{DEFAULT_LEAVE, DEFAULT_WELCOME};
use crate::utils::formatting::{mention_channel, mention_role};

/// Per-server configuration
#[poise::command(
    prefix_command,
    slash_command,
    subcommands(
        "show",
        "log_channel",
        "staff_role",
        "proof_channel",
        "welcome_channel",
        "leave_channel",
        "welcome_message",
        "leave_message",
        "invite_tracker",
        "unverified_role"
    ),
    check = "owner_or_admin",
    guild_only
)]
pub async fn config(ctx: Context<'_>) -> Result<(), Error> {
    show_settings(ctx).await
}

async fn set_id(ctx: Context<'_>, setting: SettingsId, value: u64, title: &str, shown: String) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    guild_settings::set_id(&ctx.data().pool, guild_id.get() as i64, setting, Some(value as i64)).await?;

    let embed = embeds::success_embed().title(title).description(format!("Set to {}", shown));
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

async fn set_template(ctx: Context<'_>, template: SettingsTemplate, message: String, title: &str) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let message = message.trim();
    // "reset" goes back to the built-in default
    let value = if message.eq_ignore_ascii_case("reset") { None } else { Some(message) };
    guild_settings::set_template(&ctx.data().pool, guild_id.get() as i64, template, value).await?;

    let embed = embeds::success_embed()
        .title(title)
        .description(value.unwrap_or("Reset to the default message"))
        .field("Placeholders", "`{user}` `{server}` `{count}` `{inviter}` (welcome only)", false);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Show the current configuration
#[poise::command(prefix_command, slash_command, check = "owner_or_admin", guild_only)]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    show_settings(ctx).await
}

async fn show_settings(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let s = guild_settings::get_or_default(&ctx.data().pool, guild_id.get() as i64).await?;

    let channel = |id: Option<i64>| id.map(|id| mention_channel(id as u64)).unwrap_or_else(|| "Not set".to_string());
    let role = |id: Option<i64>| id.map(|id| mention_role(id as u64)).unwrap_or_else(|| "Not set".to_string());
    let flag = |on: bool| if on { "✅ On" } else { "❌ Off" };

    let embed = embeds::standard_embed()
        .title("⚙️ Server Configuration")
        .field("Log Channel", channel(s.log_channel_id), true)
        .field("Staff Role", role(s.staff_role_id), true)
        .field("Unverified Role", role(s.unverified_role_id), true)
        .field("Proof Channel", channel(s.proof_channel_id), true)
        .field("Welcome Channel", channel(s.welcome_channel_id), true)
        .field("Leave Channel", channel(s.leave_channel_id), true)
        .field("Invite Tracker", channel(s.invite_tracker_channel_id), true)
        .field("Auto-Mod", flag(s.automod_enabled), true)
        .field("Anti-Raid", flag(s.anti_raid_enabled), true)
        .field("Anti-Nuke", flag(s.anti_nuke_enabled), true)
        .field("Invite Tracking", flag(s.invite_tracking_enabled), true)
        .field("Welcome Message", s.welcome_message.as_deref().unwrap_or(DEFAULT_WELCOME), false)
        .field("Leave Message", s.leave_message.as_deref().unwrap_or(DEFAULT_LEAVE), false);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Set the channel that moderation and security events are logged to
#[poise::command(prefix_command, slash_command, rename = "log-channel", check = "owner_or_admin", guild_only)]
pub async fn log_channel(
    ctx: Context<'_>,
    #[description = "Log channel"]
    #[channel_types("Text")]
    channel: Channel,
) -> Result<(), Error> {
    set_id(ctx, SettingsId::LogChannel, channel.id().get(), "Log Channel Set", mention_channel(channel.id().get())).await
}

/// Set the staff role that keeps access during lockdowns and tickets
#[poise::command(prefix_command, slash_command, rename = "staff-role", check = "owner_or_admin", guild_only)]
pub async fn staff_role(ctx: Context<'_>, #[description = "Staff role"] role: Role) -> Result<(), Error> {
    set_id(ctx, SettingsId::StaffRole, role.id.get(), "Staff Role Set", mention_role(role.id.get())).await
}

/// Set the channel completed middleman trades are posted to
#[poise::command(prefix_command, slash_command, rename = "proof-channel", check = "owner_or_admin", guild_only)]
pub async fn proof_channel(
    ctx: Context<'_>,
    #[description = "Proof channel"]
    #[channel_types("Text")]
    channel: Channel,
) -> Result<(), Error> {
    set_id(ctx, SettingsId::ProofChannel, channel.id().get(), "Proof Channel Set", mention_channel(channel.id().get())).await
}

/// Set the welcome channel
#[poise::command(prefix_command, slash_command, rename = "welcome-channel", check = "owner_or_admin", guild_only)]
pub async fn welcome_channel(
    ctx: Context<'_>,
    #[description = "Welcome channel"]
    #[channel_types("Text")]
    channel: Channel,
) -> Result<(), Error> {
    set_id(ctx, SettingsId::WelcomeChannel, channel.id().get(), "Welcome Channel Set", mention_channel(channel.id().get())).await
}

/// Set the leave channel
#[poise::command(prefix_command, slash_command, rename = "leave-channel", check = "owner_or_admin", guild_only)]
pub async fn leave_channel(
    ctx: Context<'_>,
    #[description = "Leave channel"]
    #[channel_types("Text")]
    channel: Channel,
) -> Result<(), Error> {
    set_id(ctx, SettingsId::LeaveChannel, channel.id().get(), "Leave Channel Set", mention_channel(channel.id().get())).await
}

/// Set the channel invite joins are announced in
#[poise::command(prefix_command, slash_command, rename = "invite-tracker", check = "owner_or_admin", guild_only)]
pub async fn invite_tracker(
    ctx: Context<'_>,
    #[description = "Tracker channel"]
    #[channel_types("Text")]
    channel: Channel,
) -> Result<(), Error> {
    set_id(
        ctx,
        SettingsId::InviteTrackerChannel,
        channel.id().get(),
        "Invite Tracker Set",
        mention_channel(channel.id().get()),
    )
    .await
}

/// Set the role given to every new member
#[poise::command(prefix_command, slash_command, rename = "unverified-role", check = "owner_or_admin", guild_only)]
pub async fn unverified_role(ctx: Context<'_>, #[description = "Unverified role"] role: Role) -> Result<(), Error> {
    set_id(ctx, SettingsId::UnverifiedRole, role.id.get(), "Unverified Role Set", mention_role(role.id.get())).await
}

/// Set the welcome message ("reset" for the default)
#[poise::command(prefix_command, slash_command, rename = "welcome-message", check = "owner_or_admin", guild_only)]
pub async fn welcome_message(
    ctx: Context<'_>,
    #[description = "Message with {user}, {server}, {count}, {inviter}"]
    #[rest]
    message: String,
) -> Result<(), Error> {
    set_template(ctx, SettingsTemplate::Welcome, message, "Welcome Message Set").await
}

/// Set the leave message ("reset" for the default)
#[poise::command(prefix_command, slash_command, rename = "leave-message", check = "owner_or_admin", guild_only)]
pub async fn leave_message(
    ctx: Context<'_>,
    #[description = "Message with {user}, {server}, {count}"]
    #[rest]
    message: String,
) -> Result<(), Error> {
    set_template(ctx, SettingsTemplate::Leave, message, "Leave Message Set").await
}
