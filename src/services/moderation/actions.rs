use std::sync::Arc;

use chrono::Utc;
use serenity::all::{
    ChannelId, ChannelType, Context, EditMember, GetMessages, GuildId, Member, MessageId,
    PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId,
};
use tracing::{debug, info, warn};

use super::hierarchy::{self, ActionCheck};
use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::automod::MAX_TIMEOUT_MINUTES;
use crate::db::queries::guild_settings;
use crate::utils::permissions;

/// Messages older than this cannot be bulk deleted
const BULK_DELETE_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60;

/// Check the role hierarchy between a moderator and their target
pub async fn check_target(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: GuildId,
    actor: &Member,
    target: &Member,
) -> Result<(), Error> {
    let guild_owner_id = ctx
        .cache
        .guild(guild_id)
        .map(|g| g.owner_id)
        .ok_or_else(|| Error::custom("Server is not cached yet, try again in a moment"))?;

    let bot_id = ctx.cache.current_user().id;
    let bot_member = guild_id.member(ctx, bot_id).await?;

    let check = ActionCheck {
        actor_id: actor.user.id.get(),
        target_id: target.user.id.get(),
        bot_owner_id: data.settings.owner_id,
        guild_owner_id: guild_owner_id.get(),
        actor_top_role: permissions::top_role_position(ctx, guild_id, actor),
        target_top_role: permissions::top_role_position(ctx, guild_id, target),
        bot_top_role: permissions::top_role_position(ctx, guild_id, &bot_member),
    };

    hierarchy::can_act_on(&check).map_err(Error::PermissionDenied)
}

/// Time a member out. Durations are clamped to the 28 day maximum
pub async fn timeout_member(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
    minutes: i64,
    reason: &str,
) -> Result<(), Error> {
    let minutes = minutes.clamp(1, MAX_TIMEOUT_MINUTES);
    let until = Utc::now() + chrono::Duration::minutes(minutes);

    guild_id
        .edit_member(
            ctx,
            user_id,
            EditMember::new()
                .disable_communication_until(until.to_rfc3339())
                .audit_log_reason(reason),
        )
        .await?;

    info!("Timed out {} in {} for {} minutes ({})", user_id, guild_id, minutes, reason);
    Ok(())
}

pub async fn clear_timeout(ctx: &Context, guild_id: GuildId, user_id: UserId) -> Result<(), Error> {
    guild_id
        .edit_member(ctx, user_id, EditMember::new().enable_communication())
        .await?;
    Ok(())
}

/// Delete recent messages in a channel, optionally only those by one author.
/// Scans the last `scan` messages and skips anything too old to bulk delete.
pub async fn purge(
    ctx: &Context,
    channel_id: ChannelId,
    scan: u8,
    author: Option<UserId>,
) -> Result<usize, Error> {
    let messages = channel_id
        .messages(ctx, GetMessages::new().limit(scan.clamp(1, 100)))
        .await?;

    let cutoff = Utc::now().timestamp() - BULK_DELETE_MAX_AGE_SECS;
    let ids: Vec<MessageId> = messages
        .iter()
        .filter(|m| author.map_or(true, |a| m.author.id == a))
        .filter(|m| m.timestamp.unix_timestamp() > cutoff)
        .map(|m| m.id)
        .collect();

    match ids.len() {
        0 => {}
        1 => channel_id.delete_message(ctx, ids[0]).await?,
        _ => channel_id.delete_messages(ctx, &ids).await?,
    }

    debug!("Purged {} messages in {}", ids.len(), channel_id);
    Ok(ids.len())
}

/// Merge a send-messages lock into an existing role overwrite.
/// Locking denies SEND_MESSAGES; unlocking returns it to neutral. Other bits are kept.
pub fn lock_overwrite(existing: Option<&PermissionOverwrite>, role: RoleId, lock: bool) -> PermissionOverwrite {
    let (mut allow, mut deny) = existing
        .map(|o| (o.allow, o.deny))
        .unwrap_or((Permissions::empty(), Permissions::empty()));

    allow.remove(Permissions::SEND_MESSAGES);
    if lock {
        deny.insert(Permissions::SEND_MESSAGES);
    } else {
        deny.remove(Permissions::SEND_MESSAGES);
    }

    PermissionOverwrite {
        allow,
        deny,
        kind: PermissionOverwriteType::Role(role),
    }
}

/// Staff role that keeps send rights in locked channels
pub async fn staff_role(data: &Arc<Data>, guild_id: GuildId) -> Result<Option<RoleId>, Error> {
    let settings = guild_settings::get_or_default(&data.pool, guild_id.get() as i64).await?;
    Ok(settings
        .staff_role_id
        .map(|id| id as u64)
        .or(data.settings.staff_role_id)
        .map(RoleId::new))
}

/// Lock or unlock one channel for @everyone
pub async fn set_channel_lock(
    ctx: &Context,
    guild_id: GuildId,
    channel_id: ChannelId,
    lock: bool,
    staff: Option<RoleId>,
) -> Result<(), Error> {
    let channel = channel_id
        .to_channel(ctx)
        .await?
        .guild()
        .ok_or_else(|| Error::InvalidOperation("That is not a server channel".to_string()))?;

    let everyone = guild_id.everyone_role();
    let existing = channel
        .permission_overwrites
        .iter()
        .find(|o| o.kind == PermissionOverwriteType::Role(everyone));

    channel_id
        .create_permission(ctx, lock_overwrite(existing, everyone, lock))
        .await?;

    if lock {
        if let Some(role) = staff {
            channel_id
                .create_permission(
                    ctx,
                    PermissionOverwrite {
                        allow: Permissions::SEND_MESSAGES,
                        deny: Permissions::empty(),
                        kind: PermissionOverwriteType::Role(role),
                    },
                )
                .await?;
        }
    }

    Ok(())
}

/// Lock or unlock every text channel. Returns how many channels were changed
pub async fn set_guild_lock(
    ctx: &Context,
    guild_id: GuildId,
    lock: bool,
    staff: Option<RoleId>,
) -> Result<usize, Error> {
    let channels = guild_id.channels(ctx).await?;
    let mut changed = 0;

    for channel in channels.values().filter(|c| c.kind == ChannelType::Text) {
        match set_channel_lock(ctx, guild_id, channel.id, lock, staff).await {
            Ok(()) => changed += 1,
            Err(e) => warn!("Could not {} channel {}: {:?}", if lock { "lock" } else { "unlock" }, channel.id, e),
        }
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_keeps_other_bits() {
        let role = RoleId::new(1);
        let existing = PermissionOverwrite {
            allow: Permissions::ADD_REACTIONS | Permissions::SEND_MESSAGES,
            deny: Permissions::ATTACH_FILES,
            kind: PermissionOverwriteType::Role(role),
        };

        let locked = lock_overwrite(Some(&existing), role, true);
        assert_eq!(locked.allow, Permissions::ADD_REACTIONS);
        assert_eq!(locked.deny, Permissions::ATTACH_FILES | Permissions::SEND_MESSAGES);

        let unlocked = lock_overwrite(Some(&locked), role, false);
        assert_eq!(unlocked.allow, Permissions::ADD_REACTIONS);
        assert_eq!(unlocked.deny, Permissions::ATTACH_FILES);
    }

    #[test]
    fn test_lock_without_existing_overwrite() {
        let locked = lock_overwrite(None, RoleId::new(1), true);
        assert_eq!(locked.allow, Permissions::empty());
        assert_eq!(locked.deny, Permissions::SEND_MESSAGES);
    }
}
