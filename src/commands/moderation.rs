use poise::serenity_prelude::{Colour, CreateMessage, EditChannel, GuildChannel, Member, User, UserId};
use poise::CreateReply;
use tracing::{debug, info};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::automod::MAX_TIMEOUT_MINUTES;
use crate::constants::embeds::{self, ERROR_COLOR, SUCCESS_COLOR, WARNING_COLOR};
use crate::db::queries::warnings;
use crate::services::audit_log;
use crate::services::moderation::actions;
use crate::utils::formatting::{mention_channel, mention_user, plural, relative_time};

const NO_REASON: &str = "No reason provided";
const MAX_SLOWMODE_SECONDS: u16 = 21600;

/// Refuse when the author (or the bot) cannot act on `target`
async fn ensure_can_act(ctx: Context<'_>, target: &Member) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let actor = ctx
        .author_member()
        .await
        .ok_or(Error::custom("Could not load your member data"))?;

    actions::check_target(ctx.serenity_context(), ctx.data(), guild_id, &actor, target).await
}

async fn log(ctx: Context<'_>, title: &str, description: String, color: Colour, fields: &[(&str, String)]) {
    if let Some(guild_id) = ctx.guild_id() {
        audit_log::log_action(ctx.serenity_context(), ctx.data(), guild_id, title, &description, color, fields).await;
    }
}

/// Kick a member from the server
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "KICK_MEMBERS",
    required_bot_permissions = "KICK_MEMBERS"
)]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "Member to kick"] member: Member,
    #[description = "Reason"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    ensure_can_act(ctx, &member).await?;
    let reason = reason.unwrap_or_else(|| NO_REASON.to_string());

    member.kick_with_reason(ctx, &reason).await?;
    info!("{} kicked {} ({})", ctx.author().id, member.user.id, reason);

    let embed = embeds::success_embed()
        .title("Member Kicked")
        .description(format!("{} has been kicked.", mention_user(member.user.id)))
        .field("Reason", &reason, false);
    ctx.send(CreateReply::default().embed(embed)).await?;

    log(
        ctx,
        "Member Kicked",
        format!("{} kicked {}", mention_user(ctx.author().id), mention_user(member.user.id)),
        WARNING_COLOR,
        &[("Reason", reason)],
    )
    .await;

    Ok(())
}

/// Ban a member from the server
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "BAN_MEMBERS",
    required_bot_permissions = "BAN_MEMBERS"
)]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "Member to ban"] member: Member,
    #[description = "Reason"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    ensure_can_act(ctx, &member).await?;
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let reason = reason.unwrap_or_else(|| NO_REASON.to_string());

    guild_id.ban_with_reason(ctx, member.user.id, 0, &reason).await?;
    info!("{} banned {} ({})", ctx.author().id, member.user.id, reason);

    let embed = embeds::success_embed()
        .title("Member Banned")
        .description(format!("{} has been banned.", mention_user(member.user.id)))
        .field("Reason", &reason, false);
    ctx.send(CreateReply::default().embed(embed)).await?;

    log(
        ctx,
        "Member Banned",
        format!("{} banned {}", mention_user(ctx.author().id), mention_user(member.user.id)),
        ERROR_COLOR,
        &[("Reason", reason)],
    )
    .await;

    Ok(())
}

/// Unban a user by ID
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "BAN_MEMBERS",
    required_bot_permissions = "BAN_MEMBERS"
)]
pub async fn unban(ctx: Context<'_>, #[description = "User to unban"] user: User) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    guild_id.unban(ctx, user.id).await?;

    let embed = embeds::success_embed()
        .title("User Unbanned")
        .description(format!("{} ({}) has been unbanned.", user.name, user.id));
    ctx.send(CreateReply::default().embed(embed)).await?;

    log(
        ctx,
        "User Unbanned",
        format!("{} unbanned {}", mention_user(ctx.author().id), mention_user(user.id)),
        SUCCESS_COLOR,
        &[],
    )
    .await;

    Ok(())
}

/// Ban and immediately unban a member to wipe their recent messages
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "BAN_MEMBERS",
    required_bot_permissions = "BAN_MEMBERS"
)]
pub async fn softban(
    ctx: Context<'_>,
    #[description = "Member to softban"] member: Member,
    #[description = "Reason"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    ensure_can_act(ctx, &member).await?;
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let reason = reason.unwrap_or_else(|| NO_REASON.to_string());

    guild_id.ban_with_reason(ctx, member.user.id, 7, &reason).await?;
    guild_id.unban(ctx, member.user.id).await?;

    let embed = embeds::success_embed()
        .title("Member Softbanned")
        .description(format!(
            "{} has been softbanned and their recent messages removed.",
            mention_user(member.user.id)
        ));
    ctx.send(CreateReply::default().embed(embed)).await?;

    log(
        ctx,
        "Member Softbanned",
        format!("{} softbanned {}", mention_user(ctx.author().id), mention_user(member.user.id)),
        WARNING_COLOR,
        &[("Reason", reason)],
    )
    .await;

    Ok(())
}

/// Time out a member
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MODERATE_MEMBERS",
    required_bot_permissions = "MODERATE_MEMBERS"
)]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "Member to time out"] member: Member,
    #[description = "Duration in minutes"]
    #[min = 1]
    #[max = 40320]
    minutes: i64,
    #[description = "Reason"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    if !(1..=MAX_TIMEOUT_MINUTES).contains(&minutes) {
        return Err(Error::InvalidOperation(format!(
            "Duration must be between 1 and {} minutes",
            MAX_TIMEOUT_MINUTES
        )));
    }
    ensure_can_act(ctx, &member).await?;
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let reason = reason.unwrap_or_else(|| NO_REASON.to_string());

    actions::timeout_member(ctx.serenity_context(), guild_id, member.user.id, minutes, &reason).await?;

    let embed = embeds::success_embed()
        .title("Member Timed Out")
        .description(format!(
            "{} has been timed out for {}.",
            mention_user(member.user.id),
            plural(minutes, "minute")
        ))
        .field("Reason", &reason, false);
    ctx.send(CreateReply::default().embed(embed)).await?;

    log(
        ctx,
        "Member Timed Out",
        format!("{} timed out {}", mention_user(ctx.author().id), mention_user(member.user.id)),
        WARNING_COLOR,
        &[("Duration", plural(minutes, "minute")), ("Reason", reason)],
    )
    .await;

    Ok(())
}

/// Remove a member's timeout
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MODERATE_MEMBERS",
    required_bot_permissions = "MODERATE_MEMBERS"
)]
pub async fn untimeout(ctx: Context<'_>, #[description = "Member"] member: Member) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    actions::clear_timeout(ctx.serenity_context(), guild_id, member.user.id).await?;

    let embed = embeds::success_embed()
        .title("Timeout Removed")
        .description(format!("{} can talk again.", mention_user(member.user.id)));
    ctx.send(CreateReply::default().embed(embed)).await?;

    log(
        ctx,
        "Timeout Removed",
        format!("{} removed the timeout of {}", mention_user(ctx.author().id), mention_user(member.user.id)),
        SUCCESS_COLOR,
        &[],
    )
    .await;

    Ok(())
}

/// Warn a member
#[poise::command(prefix_command, slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "Member to warn"] member: Member,
    #[description = "Reason"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    ensure_can_act(ctx, &member).await?;
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let reason = reason.unwrap_or_else(|| NO_REASON.to_string());
    let pool = &ctx.data().pool;

    warnings::create(
        pool,
        guild_id.get() as i64,
        member.user.id.get() as i64,
        ctx.author().id.get() as i64,
        &reason,
    )
    .await?;
    let total = warnings::count_for_user(pool, guild_id.get() as i64, member.user.id.get() as i64).await?;

    let guild_name = ctx.guild().map(|g| g.name.clone()).unwrap_or_default();
    let dm = embeds::warning_embed()
        .title(format!("You were warned in {}", guild_name))
        .field("Reason", &reason, false)
        .field("Total Warnings", total.to_string(), false);
    if let Err(e) = member
        .user
        .direct_message(ctx, CreateMessage::new().embed(dm))
        .await
    {
        debug!("Could not DM warning to {}: {:?}", member.user.id, e);
    }

    let embed = embeds::warning_embed()
        .title("Member Warned")
        .description(format!(
            "{} has been warned. They now have {}.",
            mention_user(member.user.id),
            plural(total, "warning")
        ))
        .field("Reason", &reason, false);
    ctx.send(CreateReply::default().embed(embed)).await?;

    log(
        ctx,
        "Member Warned",
        format!("{} warned {}", mention_user(ctx.author().id), mention_user(member.user.id)),
        WARNING_COLOR,
        &[("Reason", reason), ("Total", total.to_string())],
    )
    .await;

    Ok(())
}

/// Show a member's warnings
#[poise::command(prefix_command, slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn warnings(ctx: Context<'_>, #[description = "Member"] member: Member) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let data = ctx.data();
    let list = warnings::for_user(&data.pool, guild_id.get() as i64, member.user.id.get() as i64).await?;
    let spam = data.violations.count(&data.pool, guild_id.get(), member.user.id.get()).await?;

    if list.is_empty() && spam == 0 {
        let embed = embeds::success_embed()
            .description(format!("{} has no warnings.", mention_user(member.user.id)));
        ctx.send(CreateReply::default().embed(embed)).await?;
        return Ok(());
    }

    let mut embed = embeds::warning_embed()
        .title(format!("Warnings for {}", member.user.name))
        .description(format!(
            "{} in total, {}",
            plural(list.len() as i64, "warning"),
            plural(spam as i64, "spam violation")
        ));
    for (i, warning) in list.iter().take(10).enumerate() {
        embed = embed.field(
            format!("#{}", i + 1),
            format!(
                "{}\nBy {} {}",
                warning.reason,
                mention_user(UserId::new(warning.moderator_id as u64)),
                relative_time(warning.created_at.timestamp())
            ),
            false,
        );
    }

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Clear a member's warnings and spam violations
#[poise::command(prefix_command, slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn clearwarnings(ctx: Context<'_>, #[description = "Member"] member: Member) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let data = ctx.data();
    let removed = warnings::clear(&data.pool, guild_id.get() as i64, member.user.id.get() as i64).await?;
    // Spam escalation starts over too
    data.violations.clear(&data.pool, guild_id.get(), member.user.id.get()).await?;

    let embed = embeds::success_embed().description(format!(
        "Cleared {} and the spam record for {}.",
        plural(removed as i64, "warning"),
        mention_user(member.user.id)
    ));
    ctx.send(CreateReply::default().embed(embed)).await?;

    log(
        ctx,
        "Warnings Cleared",
        format!("{} cleared the warnings of {}", mention_user(ctx.author().id), mention_user(member.user.id)),
        SUCCESS_COLOR,
        &[("Removed", removed.to_string())],
    )
    .await;

    Ok(())
}

/// Delete the invoking prefix message so it is not counted by a purge
async fn delete_invocation(ctx: Context<'_>) {
    if let poise::Context::Prefix(prefix) = ctx {
        if let Err(e) = prefix.msg.delete(ctx).await {
            debug!("Could not delete purge command message: {:?}", e);
        }
    }
}

/// Bulk delete recent messages in this channel
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_MESSAGES",
    required_bot_permissions = "MANAGE_MESSAGES"
)]
pub async fn purge(
    ctx: Context<'_>,
    #[description = "Number of messages (1-100)"]
    #[min = 1]
    #[max = 100]
    amount: u8,
) -> Result<(), Error> {
    if !(1..=100).contains(&amount) {
        return Err(Error::InvalidOperation("Amount must be between 1 and 100".to_string()));
    }

    delete_invocation(ctx).await;
    let deleted = actions::purge(ctx.serenity_context(), ctx.channel_id(), amount, None).await?;

    let embed = embeds::success_embed().description(format!("🗑 Deleted {}.", plural(deleted as i64, "message")));
    ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await?;

    log(
        ctx,
        "Messages Purged",
        format!("{} purged {}", mention_user(ctx.author().id), mention_channel(ctx.channel_id().get())),
        WARNING_COLOR,
        &[("Count", deleted.to_string())],
    )
    .await;

    Ok(())
}

/// Delete a member's recent messages in this channel
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_MESSAGES",
    required_bot_permissions = "MANAGE_MESSAGES"
)]
pub async fn purgeuser(
    ctx: Context<'_>,
    #[description = "Member whose messages to delete"] member: Member,
    #[description = "Messages to scan (default 100)"]
    #[min = 1]
    #[max = 100]
    amount: Option<u8>,
) -> Result<(), Error> {
    delete_invocation(ctx).await;
    let deleted = actions::purge(
        ctx.serenity_context(),
        ctx.channel_id(),
        amount.unwrap_or(100),
        Some(member.user.id),
    )
    .await?;

    let embed = embeds::success_embed().description(format!(
        "🗑 Deleted {} from {}.",
        plural(deleted as i64, "message"),
        mention_user(member.user.id)
    ));
    ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await?;

    log(
        ctx,
        "User Messages Purged",
        format!(
            "{} purged messages from {} in {}",
            mention_user(ctx.author().id),
            mention_user(member.user.id),
            mention_channel(ctx.channel_id().get())
        ),
        WARNING_COLOR,
        &[("Count", deleted.to_string())],
    )
    .await;

    Ok(())
}

/// Set the slowmode of this channel (0 turns it off)
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_CHANNELS",
    required_bot_permissions = "MANAGE_CHANNELS"
)]
pub async fn slowmode(
    ctx: Context<'_>,
    #[description = "Seconds between messages (0-21600)"]
    #[min = 0]
    #[max = 21600]
    seconds: u16,
) -> Result<(), Error> {
    if seconds > MAX_SLOWMODE_SECONDS {
        return Err(Error::InvalidOperation(format!(
            "Slowmode must be between 0 and {} seconds",
            MAX_SLOWMODE_SECONDS
        )));
    }

    ctx.channel_id()
        .edit(ctx, EditChannel::new().rate_limit_per_user(seconds))
        .await?;

    let text = if seconds == 0 {
        "Slowmode disabled.".to_string()
    } else {
        format!("Slowmode set to {}.", plural(seconds as i64, "second"))
    };
    ctx.send(CreateReply::default().embed(embeds::success_embed().description(text))).await?;

    Ok(())
}

/// Stop @everyone from talking in a channel
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_CHANNELS",
    required_bot_permissions = "MANAGE_ROLES"
)]
pub async fn lock(
    ctx: Context<'_>,
    #[description = "Channel to lock (defaults to this one)"] channel: Option<GuildChannel>,
) -> Result<(), Error> {
    set_lock(ctx, channel, true).await
}

/// Let @everyone talk in a channel again
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_CHANNELS",
    required_bot_permissions = "MANAGE_ROLES"
)]
pub async fn unlock(
    ctx: Context<'_>,
    #[description = "Channel to unlock (defaults to this one)"] channel: Option<GuildChannel>,
) -> Result<(), Error> {
    set_lock(ctx, channel, false).await
}

async fn set_lock(ctx: Context<'_>, channel: Option<GuildChannel>, lock: bool) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let channel_id = channel.map(|c| c.id).unwrap_or_else(|| ctx.channel_id());
    let staff = actions::staff_role(ctx.data(), guild_id).await?;

    actions::set_channel_lock(ctx.serenity_context(), guild_id, channel_id, lock, staff).await?;

    let (title, color) = if lock { ("🔒 Channel Locked", ERROR_COLOR) } else { ("🔓 Channel Unlocked", SUCCESS_COLOR) };
    let embed = embeds::standard_embed()
        .title(title)
        .description(mention_channel(channel_id.get()))
        .color(color);
    ctx.send(CreateReply::default().embed(embed)).await?;

    log(
        ctx,
        title,
        format!("{} by {}", mention_channel(channel_id.get()), mention_user(ctx.author().id)),
        color,
        &[],
    )
    .await;

    Ok(())
}

/// Lock every text channel in the server
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    required_bot_permissions = "MANAGE_ROLES"
)]
pub async fn lockdown(ctx: Context<'_>) -> Result<(), Error> {
    set_guild_lock(ctx, true).await
}

/// Unlock every text channel in the server
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    required_bot_permissions = "MANAGE_ROLES"
)]
pub async fn unlockdown(ctx: Context<'_>) -> Result<(), Error> {
    set_guild_lock(ctx, false).await
}

async fn set_guild_lock(ctx: Context<'_>, lock: bool) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    ctx.defer().await?;

    let staff = actions::staff_role(ctx.data(), guild_id).await?;
    let changed = actions::set_guild_lock(ctx.serenity_context(), guild_id, lock, staff).await?;

    let (title, color) = if lock {
        ("🔒 Server Lockdown", ERROR_COLOR)
    } else {
        ("🔓 Lockdown Lifted", SUCCESS_COLOR)
    };
    let embed = embeds::standard_embed()
        .title(title)
        .description(format!("{} updated.", plural(changed as i64, "channel")))
        .color(color);
    ctx.send(CreateReply::default().embed(embed)).await?;

    log(
        ctx,
        title,
        format!("Triggered by {}", mention_user(ctx.author().id)),
        color,
        &[("Channels", changed.to_string())],
    )
    .await;

    Ok(())
}
