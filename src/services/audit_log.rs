use std::sync::Arc;

use serenity::all::{
    ChannelId, ChannelType, Colour, Context, CreateChannel, CreateMessage, GuildId,
    PermissionOverwrite, PermissionOverwriteType, Permissions,
};
use tracing::{error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::constants::security::LOG_CHANNEL_NAME;
use crate::db::queries::guild_settings::{self, SettingsId};

/// Resolve the guild's log channel, creating a hidden `security-logs` channel
/// when none is configured
pub async fn get_log_channel(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: GuildId,
) -> Result<ChannelId, Error> {
    let settings = guild_settings::get_or_default(&data.pool, guild_id.get() as i64).await?;
    let channels = guild_id.channels(ctx).await?;

    if let Some(id) = settings.log_channel_id {
        let channel_id = ChannelId::new(id as u64);
        if channels.contains_key(&channel_id) {
            return Ok(channel_id);
        }
        warn!("Configured log channel {} in guild {} no longer exists", id, guild_id);
    }

    let existing = channels
        .values()
        .find(|c| c.kind == ChannelType::Text && c.name == LOG_CHANNEL_NAME)
        .map(|c| c.id);

    let channel_id = match existing {
        Some(id) => id,
        None => {
            let bot_id = ctx.cache.current_user().id;
            let overwrites = vec![
                PermissionOverwrite {
                    allow: Permissions::empty(),
                    deny: Permissions::VIEW_CHANNEL,
                    kind: PermissionOverwriteType::Role(guild_id.everyone_role()),
                },
                PermissionOverwrite {
                    allow: Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES,
                    deny: Permissions::empty(),
                    kind: PermissionOverwriteType::Member(bot_id),
                },
            ];

            let channel = guild_id
                .create_channel(
                    ctx,
                    CreateChannel::new(LOG_CHANNEL_NAME)
                        .kind(ChannelType::Text)
                        .permissions(overwrites)
                        .audit_log_reason("logging channel"),
                )
                .await?;

            info!("Created log channel {} in guild {}", channel.id, guild_id);
            channel.id
        }
    };

    guild_settings::set_id(
        &data.pool,
        guild_id.get() as i64,
        SettingsId::LogChannel,
        Some(channel_id.get() as i64),
    )
    .await?;

    Ok(channel_id)
}

/// Post an action embed to the guild's log channel. Failures are logged and swallowed
pub async fn log_action(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: GuildId,
    title: &str,
    description: &str,
    color: Colour,
    fields: &[(&str, String)],
) {
    let channel_id = match get_log_channel(ctx, data, guild_id).await {
        Ok(id) => id,
        Err(e) => {
            error!("Could not resolve log channel for guild {}: {:?}", guild_id, e);
            return;
        }
    };

    let mut embed = embeds::timestamped(
        embeds::standard_embed()
            .title(title)
            .description(description)
            .color(color),
    );
    for (name, value) in fields {
        embed = embed.field(*name, value, true);
    }

    if let Err(e) = channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await
    {
        error!("Failed to post to log channel {}: {:?}", channel_id, e);
    }
}
