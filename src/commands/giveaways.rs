use chrono::{DateTime, Duration, Utc};
use poise::serenity_prelude::{ChannelId, CreateMessage, EditMessage, MessageId, UserId};
use poise::CreateReply;
use tracing::{info, warn};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::services::audit_log;
use crate::services::giveaways::{runner, Giveaway, GiveawayError};
use crate::utils::formatting::{mention_channel, mention_user, relative_time};

/// Split an optional leading image URL off the rest of the arguments
pub fn split_image(details: &str) -> (Option<String>, String) {
    let details = details.trim();
    let mut parts = details.splitn(2, char::is_whitespace);
    match parts.next() {
        Some(first) if first.starts_with("http://") || first.starts_with("https://") => (
            Some(first.to_string()),
            parts.next().unwrap_or("").trim().to_string(),
        ),
        _ => (None, details.to_string()),
    }
}

/// When a giveaway started at `now` for `minutes` ends
pub fn end_time(now: DateTime<Utc>, minutes: i64) -> Result<DateTime<Utc>, GiveawayError> {
    if minutes < 1 {
        return Err(GiveawayError::InvalidDuration);
    }
    Duration::try_minutes(minutes)
        .and_then(|length| now.checked_add_signed(length))
        .ok_or(GiveawayError::InvalidDuration)
}

fn parse_message_id(raw: &str) -> Result<u64, Error> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::InvalidOperation(format!("`{}` is not a message ID", raw.trim())))
}

/// Start a giveaway in this channel
#[poise::command(prefix_command, slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn gcreate(
    ctx: Context<'_>,
    #[description = "Duration in minutes"] minutes: i64,
    #[description = "Number of winners"] winners: u32,
    #[description = "Optional image URL followed by the prize"]
    #[rest]
    details: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let ends_at = end_time(Utc::now(), minutes)?;
    if winners < 1 {
        return Err(GiveawayError::InvalidWinnerCount.into());
    }

    let (image_url, prize) = split_image(&details);
    if prize.is_empty() {
        return Err(Error::InvalidOperation("Please name a prize".to_string()));
    }

    let mut giveaway = Giveaway {
        message_id: 0,
        channel_id: ctx.channel_id().get(),
        guild_id: guild_id.get(),
        host_id: ctx.author().id.get(),
        prize,
        winner_count: winners,
        entries: Vec::new(),
        ends_at,
        image_url,
        ended: false,
        winners: Vec::new(),
    };

    let mut message = ctx
        .channel_id()
        .send_message(
            ctx,
            CreateMessage::new()
                .embed(runner::active_embed(&giveaway))
                .components(vec![runner::entry_row()]),
        )
        .await?;
    giveaway.message_id = message.id.get();
    message
        .edit(ctx, EditMessage::new().embed(runner::active_embed(&giveaway)))
        .await?;

    let data = ctx.data();
    data.giveaways.insert(giveaway.clone()).await?;
    runner::schedule(ctx.serenity_context(), data, &giveaway);
    info!("Giveaway {} for {} started by {}", giveaway.message_id, giveaway.prize, ctx.author().id);

    audit_log::log_action(
        ctx.serenity_context(),
        data,
        guild_id,
        "Giveaway started",
        &format!("**Prize:** {}\nHost: {}", giveaway.prize, mention_user(ctx.author().id)),
        embeds::GOLD_COLOR,
        &[
            ("Winners", winners.to_string()),
            ("Ends", relative_time(giveaway.ends_at.timestamp())),
        ],
    )
    .await;

    ctx.send(
        CreateReply::default()
            .content(format!("✅ Giveaway started! Message ID: `{}`", giveaway.message_id))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// End a giveaway early
#[poise::command(prefix_command, slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn gend(
    ctx: Context<'_>,
    #[description = "Giveaway message ID"] message_id: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let message_id = parse_message_id(&message_id)?;

    match runner::end_giveaway(ctx.serenity_context(), ctx.data(), guild_id.get(), message_id).await? {
        Some(_) => ctx.say("✅ Giveaway ended!").await?,
        None => return Err(GiveawayError::Ended.into()),
    };
    Ok(())
}

/// Pick a new winner for a giveaway
#[poise::command(prefix_command, slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn greroll(
    ctx: Context<'_>,
    #[description = "Giveaway message ID"] message_id: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let message_id = parse_message_id(&message_id)?;
    let (giveaway, winner) = ctx.data().giveaways.reroll(guild_id.get(), message_id).await?;

    ChannelId::new(giveaway.channel_id)
        .say(
            ctx,
            format!(
                "🎉 New winner: {}! You won **{}**!",
                mention_user(UserId::new(winner)),
                giveaway.prize
            ),
        )
        .await?;
    runner::dm_winners(ctx.serenity_context(), &giveaway, &[winner]).await;

    ctx.send(CreateReply::default().content("✅ Giveaway rerolled!").ephemeral(true))
        .await?;
    Ok(())
}

/// List running giveaways
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn glist(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let active = ctx.data().giveaways.active_in_guild(guild_id.get()).await;

    if active.is_empty() {
        ctx.say("No active giveaways in this server!").await?;
        return Ok(());
    }

    let mut embed = embeds::gold_embed().title("🎉 Active Giveaways");
    for giveaway in active.iter().take(25) {
        embed = embed.field(
            &giveaway.prize,
            format!(
                "**Ends:** {}\n**Entries:** {}\n**Channel:** {}\n**ID:** `{}`",
                relative_time(giveaway.ends_at.timestamp()),
                giveaway.entries.len(),
                mention_channel(giveaway.channel_id),
                giveaway.message_id
            ),
            false,
        );
    }

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Delete a giveaway and its message
#[poise::command(prefix_command, slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn gdelete(
    ctx: Context<'_>,
    #[description = "Giveaway message ID"] message_id: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let message_id = parse_message_id(&message_id)?;
    let data = ctx.data();

    let giveaway = data.giveaways.remove(guild_id.get(), message_id).await?;
    data.cancel_giveaway_timer(message_id);

    if let Err(e) = ChannelId::new(giveaway.channel_id)
        .delete_message(ctx, MessageId::new(giveaway.message_id))
        .await
    {
        warn!("Could not delete giveaway message {}: {:?}", giveaway.message_id, e);
    }

    ctx.send(CreateReply::default().content("✅ Giveaway deleted!").ephemeral(true))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_image_with_url() {
        let (image, prize) = split_image("https://i.imgur.com/a.png Nitro Classic");
        assert_eq!(image.as_deref(), Some("https://i.imgur.com/a.png"));
        assert_eq!(prize, "Nitro Classic");
    }

    #[test]
    fn test_split_image_without_url() {
        let (image, prize) = split_image("  Nitro Classic ");
        assert!(image.is_none());
        assert_eq!(prize, "Nitro Classic");
    }

    #[test]
    fn test_split_image_url_only() {
        let (image, prize) = split_image("https://x.y/z.png");
        assert!(image.is_some());
        assert!(prize.is_empty());
    }

    #[test]
    fn test_end_time() {
        let now = Utc::now();
        assert_eq!(end_time(now, 90).ok(), Some(now + Duration::minutes(90)));
        assert!(matches!(end_time(now, 0), Err(GiveawayError::InvalidDuration)));
        assert!(matches!(end_time(now, -5), Err(GiveawayError::InvalidDuration)));
    }

    #[test]
    fn test_end_time_overflow_is_rejected() {
        let now = Utc::now();
        assert!(matches!(end_time(now, i64::MAX), Err(GiveawayError::InvalidDuration)));
        assert!(matches!(end_time(now, i64::MAX / 60_000), Err(GiveawayError::InvalidDuration)));
    }

    #[test]
    fn test_parse_message_id() {
        assert_eq!(parse_message_id(" 123 ").ok(), Some(123));
        assert!(parse_message_id("abc").is_err());
    }
}
