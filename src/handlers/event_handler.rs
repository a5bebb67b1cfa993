use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::{debug, error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::{interaction, member, message};
use crate::services::community::invites;
use crate::services::security::antinuke;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!("Bot ready as {}", data_about_bot.user.name);
            data.set_guild_count(data_about_bot.guilds.len());
        }

        FullEvent::GuildCreate { guild, .. } => {
            data.set_guild_count(ctx.cache.guild_count());
            match invites::refresh(ctx, data, guild.id).await {
                Ok(count) => debug!("Cached {} invites for {}", count, guild.name),
                Err(e) => debug!("Could not cache invites for {}: {:?}", guild.id, e),
            }
        }

        FullEvent::GuildDelete { incomplete, .. } => {
            data.set_guild_count(ctx.cache.guild_count());
            debug!("Guild {} removed", incomplete.id);
        }

        FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) = member::handle_member_join(ctx, data, new_member).await {
                error!("Member join handler error: {:?}", e);
            }
        }

        FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
            if let Err(e) = member::handle_member_leave(ctx, data, *guild_id, user).await {
                error!("Member leave handler error: {:?}", e);
            }
        }

        FullEvent::GuildMemberUpdate { old_if_available, new, .. } => {
            // Without the previous roles there is nothing to compare against
            if let (Some(old), Some(new)) = (old_if_available, new) {
                if let Err(e) = antinuke::guard_role_grant(ctx, data, old, new).await {
                    error!("Role grant guard error: {:?}", e);
                }
            }
        }

        FullEvent::Message { new_message } => {
            if let Err(e) = message::handle_message(ctx, data, new_message).await {
                error!("Auto-moderation error: {:?}", e);
            }
        }

        FullEvent::MessageUpdate { new, event, .. } => {
            if let Err(e) = message::handle_message_update(ctx, data, new.as_ref(), event).await {
                error!("Edit re-check error: {:?}", e);
            }
        }

        FullEvent::InviteCreate { data: invite } => {
            if let Some(guild_id) = invite.guild_id {
                if let Err(e) = invites::refresh(ctx, data, guild_id).await {
                    error!("Failed to refresh invites for {}: {:?}", guild_id, e);
                }
            }
        }

        FullEvent::InviteDelete { data: invite } => {
            if let Some(guild_id) = invite.guild_id {
                if let Err(e) = invites::refresh(ctx, data, guild_id).await {
                    error!("Failed to refresh invites for {}: {:?}", guild_id, e);
                }
            }
        }

        FullEvent::InteractionCreate { interaction } => {
            // Poise handles ApplicationCommand (slash commands) automatically
            // We only handle Component and Modal interactions here for custom components
            match interaction {
                serenity::Interaction::Component(_) | serenity::Interaction::Modal(_) => {
                    if let Err(e) = interaction::handle_interaction(ctx, data, interaction).await {
                        error!("Component/Modal interaction handler error: {:?}", e);
                    }
                }
                _ => {}
            }
        }

        _ => {}
    }

    Ok(())
}
