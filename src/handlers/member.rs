use std::sync::Arc;

use serenity::all::{Context, GuildId, Member, RoleId, User, UserId};
use tracing::{error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::embeds::{ERROR_COLOR, WARNING_COLOR};
use crate::db::queries::guild_settings;
use crate::services::alt::responder;
use crate::services::audit_log;
use crate::services::community::{invites, welcome};
use crate::services::security::{antinuke, raid};
use crate::utils::formatting::mention_user;
use crate::utils::permissions::is_trusted;

pub async fn handle_member_join(ctx: &Context, data: &Arc<Data>, member: &Member) -> Result<(), Error> {
    let guild_id = member.guild_id;

    if data.is_blacklisted(member.user.id.get()) {
        member
            .kick_with_reason(ctx, "Blacklisted user tried to join")
            .await?;
        info!("Kicked blacklisted user {} from {}", member.user.id, guild_id);
        audit_log::log_action(
            ctx,
            data,
            guild_id,
            "Blacklisted User Kicked",
            &format!("{} tried to join but is blacklisted", mention_user(member.user.id)),
            ERROR_COLOR,
            &[("User ID", member.user.id.to_string())],
        )
        .await;
        return Ok(());
    }

    let settings = guild_settings::get_or_default(&data.pool, guild_id.get() as i64).await?;

    let inviter = match invites::track_join(ctx, data, &settings, member).await {
        Ok(join) => join.and_then(|j| j.inviter_id).map(|id| UserId::new(id as u64)),
        Err(e) => {
            error!("Invite tracking failed in {}: {:?}", guild_id, e);
            None
        }
    };

    if let Some(role) = settings.unverified_role_id {
        if let Err(e) = member.add_role(ctx, RoleId::new(role as u64)).await {
            error!("Failed to assign unverified role in {}: {:?}", guild_id, e);
        }
    }

    if settings.anti_raid_enabled && !member.user.bot && !is_trusted(data, member.user.id) {
        if let Err(e) = responder::screen_member(ctx, data, member).await {
            error!("Alt screening failed for {}: {:?}", member.user.id, e);
        }
    }

    welcome::send_welcome(ctx, &settings, member, inviter).await;

    if member.user.bot {
        if let Err(e) = antinuke::guard_bot_join(ctx, data, member).await {
            error!("Bot guard failed for {}: {:?}", member.user.id, e);
        }
    }

    raid::record_join(ctx, data, guild_id).await?;

    Ok(())
}

pub async fn handle_member_leave(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: GuildId,
    user: &User,
) -> Result<(), Error> {
    let settings = guild_settings::get_or_default(&data.pool, guild_id.get() as i64).await?;
    welcome::send_leave(ctx, &settings, guild_id, user).await;

    audit_log::log_action(
        ctx,
        data,
        guild_id,
        "Member Left",
        &format!("{} ({}) left the server", mention_user(user.id), user.name),
        WARNING_COLOR,
        &[("User ID", user.id.to_string())],
    )
    .await;

    Ok(())
}
