use std::sync::Arc;

use serenity::all::{ChannelId, Context, CreateMessage, GuildId, Message, UserId};
use tracing::{debug, error, info};

use super::filters;
use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::automod::*;
use crate::constants::embeds::{ALERT_COLOR, ERROR_COLOR, WARNING_COLOR};
use crate::db::queries::guild_settings;
use crate::services::audit_log;
use crate::services::moderation::actions;
use crate::utils::formatting::mention_user;
use crate::utils::{permissions, profanity};

/// What a message was caught for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    Blacklisted,
    Spam,
    Profanity(String),
    MentionSpam,
    LinkSpam,
    ExcessiveCaps,
}

/// Run a new message through the auto-moderation pipeline.
/// Only the first matching rule is applied.
pub async fn check_message(ctx: &Context, data: &Arc<Data>, msg: &Message) -> Result<Verdict, Error> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(Verdict::Clean);
    };
    if msg.author.bot || permissions::is_trusted(data, msg.author.id) {
        return Ok(Verdict::Clean);
    }

    if data.is_blacklisted(msg.author.id.get()) {
        delete_quietly(ctx, msg).await;
        actions::timeout_member(
            ctx,
            guild_id,
            msg.author.id,
            BLACKLIST_TIMEOUT_MINUTES,
            "Blacklisted user",
        )
        .await?;
        return Ok(Verdict::Blacklisted);
    }

    let settings = guild_settings::get_or_default(&data.pool, guild_id.get() as i64).await?;
    if !settings.automod_enabled {
        return Ok(Verdict::Clean);
    }

    let key = (guild_id.get(), msg.author.id.get());

    if data.message_window.record(key) >= SPAM_THRESHOLD {
        data.message_window.clear(&key);
        handle_spam(ctx, data, guild_id, msg).await?;
        return Ok(Verdict::Spam);
    }

    if let Some(word) = profanity::contains_profanity(&msg.content) {
        handle_profanity(ctx, data, guild_id, msg, &word).await?;
        return Ok(Verdict::Profanity(word));
    }

    if filters::is_mention_spam(msg.mentions.len(), msg.mention_roles.len()) {
        delete_quietly(ctx, msg).await;
        actions::timeout_member(
            ctx,
            guild_id,
            msg.author.id,
            MENTION_TIMEOUT_MINUTES,
            "Mass mentions",
        )
        .await?;
        send_warning(ctx, msg.channel_id, msg.author.id, "mass mentions are not allowed.").await;
        audit_log::log_action(
            ctx,
            data,
            guild_id,
            "Mention Spam",
            &format!("{} was timed out for mass mentions", mention_user(msg.author.id)),
            WARNING_COLOR,
            &[("Duration", format!("{} minutes", MENTION_TIMEOUT_MINUTES))],
        )
        .await;
        return Ok(Verdict::MentionSpam);
    }

    if filters::has_links(&msg.content) && data.link_window.record(key) >= LINK_LIMIT {
        data.link_window.clear(&key);
        delete_quietly(ctx, msg).await;
        actions::timeout_member(ctx, guild_id, msg.author.id, LINK_TIMEOUT_MINUTES, "Link spam").await?;
        send_warning(ctx, msg.channel_id, msg.author.id, "slow down with the links.").await;
        audit_log::log_action(
            ctx,
            data,
            guild_id,
            "Link Spam",
            &format!("{} was timed out for posting links too fast", mention_user(msg.author.id)),
            WARNING_COLOR,
            &[("Duration", format!("{} minutes", LINK_TIMEOUT_MINUTES))],
        )
        .await;
        return Ok(Verdict::LinkSpam);
    }

    if filters::is_excessive_caps(&msg.content) {
        delete_quietly(ctx, msg).await;
        send_warning(ctx, msg.channel_id, msg.author.id, "please don't type in all caps.").await;
        return Ok(Verdict::ExcessiveCaps);
    }

    Ok(Verdict::Clean)
}

/// Edited messages are only re-checked for profanity
pub async fn check_edit(ctx: &Context, data: &Arc<Data>, msg: &Message) -> Result<Verdict, Error> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(Verdict::Clean);
    };
    if msg.author.bot || permissions::is_trusted(data, msg.author.id) {
        return Ok(Verdict::Clean);
    }

    let settings = guild_settings::get_or_default(&data.pool, guild_id.get() as i64).await?;
    if !settings.automod_enabled {
        return Ok(Verdict::Clean);
    }

    match profanity::contains_profanity(&msg.content) {
        Some(word) => {
            handle_profanity(ctx, data, guild_id, msg, &word).await?;
            Ok(Verdict::Profanity(word))
        }
        None => Ok(Verdict::Clean),
    }
}

async fn handle_spam(ctx: &Context, data: &Arc<Data>, guild_id: GuildId, msg: &Message) -> Result<(), Error> {
    let count = data
        .violations
        .increment(&data.pool, guild_id.get(), msg.author.id.get())
        .await?;

    let minutes = spam_timeout_minutes(count);
    actions::timeout_member(ctx, guild_id, msg.author.id, minutes, "Spamming").await?;

    match actions::purge(ctx, msg.channel_id, SPAM_PURGE_SCAN, Some(msg.author.id)).await {
        Ok(n) => debug!("Removed {} spam messages from {}", n, msg.author.id),
        Err(e) => error!("Failed to purge spam from {}: {:?}", msg.author.id, e),
    }

    info!(
        "Spam from {} in {} (violation #{}), timed out for {}m",
        msg.author.id, guild_id, count, minutes
    );

    send_warning(
        ctx,
        msg.channel_id,
        msg.author.id,
        &format!("stop spamming. You have been timed out for {} minutes.", minutes),
    )
    .await;

    audit_log::log_action(
        ctx,
        data,
        guild_id,
        "Spam Detected",
        &format!("{} was timed out for spamming", mention_user(msg.author.id)),
        ALERT_COLOR,
        &[
            ("Violation", format!("#{}", count)),
            ("Duration", format!("{} minutes", minutes)),
        ],
    )
    .await;

    Ok(())
}

async fn handle_profanity(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: GuildId,
    msg: &Message,
    word: &str,
) -> Result<(), Error> {
    delete_quietly(ctx, msg).await;
    actions::timeout_member(
        ctx,
        guild_id,
        msg.author.id,
        PROFANITY_TIMEOUT_MINUTES,
        "Prohibited language",
    )
    .await?;
    send_warning(ctx, msg.channel_id, msg.author.id, "that language is not allowed here.").await;

    audit_log::log_action(
        ctx,
        data,
        guild_id,
        "Prohibited Language",
        &format!("{} used a banned word", mention_user(msg.author.id)),
        ERROR_COLOR,
        &[
            ("Word", format!("||{}||", word)),
            ("Duration", format!("{} minutes", PROFANITY_TIMEOUT_MINUTES)),
        ],
    )
    .await;

    Ok(())
}

async fn delete_quietly(ctx: &Context, msg: &Message) {
    if let Err(e) = msg.delete(ctx).await {
        debug!("Could not delete message {}: {:?}", msg.id, e);
    }
}

/// Post a warning that removes itself after a few seconds
async fn send_warning(ctx: &Context, channel_id: ChannelId, user_id: UserId, text: &str) {
    let content = format!("{}, {}", mention_user(user_id), text);
    let sent = match channel_id.send_message(ctx, CreateMessage::new().content(content)).await {
        Ok(m) => m,
        Err(e) => {
            debug!("Could not send warning in {}: {:?}", channel_id, e);
            return;
        }
    };

    let http = ctx.http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(WARNING_LIFETIME).await;
        let _ = sent.delete(&*http).await;
    });
}
