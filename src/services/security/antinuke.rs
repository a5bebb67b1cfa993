use std::sync::Arc;

use serenity::all::{Context, GuildId, Member, Permissions, RoleId, UserId};
use serenity::model::guild::audit_log::{Action, MemberAction};
use tracing::{error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::embeds::{ERROR_COLOR, SUCCESS_COLOR};
use crate::constants::security::{dangerous_permissions, AUDIT_LOG_DELAY};
use crate::db::queries::guild_settings;
use crate::services::audit_log;
use crate::utils::formatting::{mention_role, mention_user};
use crate::utils::permissions;

/// Roles present in `new` but not `old` whose permissions include a dangerous bit
pub fn dangerous_grants(
    old: &[RoleId],
    new: &[RoleId],
    permissions_of: impl Fn(RoleId) -> Permissions,
) -> Vec<RoleId> {
    let dangerous = dangerous_permissions();
    new.iter()
        .filter(|id| !old.contains(id))
        .filter(|id| permissions_of(**id).intersects(dangerous))
        .copied()
        .collect()
}

/// Find who performed the most recent audit log action against `target`
async fn find_executor(
    ctx: &Context,
    guild_id: GuildId,
    action: MemberAction,
    target: UserId,
) -> Result<Option<UserId>, Error> {
    let logs = guild_id
        .audit_logs(ctx, Some(Action::Member(action)), None, None, Some(5))
        .await?;

    Ok(logs
        .entries
        .iter()
        .find(|entry| entry.target_id.map(|t| t.get()) == Some(target.get()))
        .map(|entry| entry.user_id))
}

/// Kick bots added by anyone other than the owner or a whitelisted user
pub async fn guard_bot_join(ctx: &Context, data: &Arc<Data>, member: &Member) -> Result<(), Error> {
    let guild_id = member.guild_id;

    tokio::time::sleep(AUDIT_LOG_DELAY).await;

    let Some(inviter) = find_executor(ctx, guild_id, MemberAction::BotAdd, member.user.id).await? else {
        warn!("No audit log entry for bot {} in {}", member.user.id, guild_id);
        return Ok(());
    };

    if permissions::is_trusted(data, inviter) {
        audit_log::log_action(
            ctx,
            data,
            guild_id,
            "Bot Added (authorized)",
            &format!("{} added {}", mention_user(inviter), mention_user(member.user.id)),
            SUCCESS_COLOR,
            &[],
        )
        .await;
        return Ok(());
    }

    let settings = guild_settings::get_or_default(&data.pool, guild_id.get() as i64).await?;
    if !settings.anti_nuke_enabled {
        return Ok(());
    }

    member
        .kick_with_reason(ctx, &format!("Unauthorized bot addition by {}", inviter))
        .await?;
    info!("Kicked unauthorized bot {} added by {} in {}", member.user.id, inviter, guild_id);

    let stripped = strip_roles(ctx, guild_id, inviter, "Unauthorized bot addition").await;
    let action = match stripped {
        Ok(n) if n > 0 => format!("Bot kicked, {} inviter roles stripped", n),
        Ok(_) => "Bot kicked".to_string(),
        Err(e) => {
            error!("Failed to strip roles from {}: {:?}", inviter, e);
            "Bot kicked, could not strip inviter roles".to_string()
        }
    };

    audit_log::log_action(
        ctx,
        data,
        guild_id,
        "Anti-Nuke: Unauthorized Bot Blocked",
        &format!(
            "Bot: {}\nAdded by: {}",
            mention_user(member.user.id),
            mention_user(inviter)
        ),
        ERROR_COLOR,
        &[("Action", action)],
    )
    .await;

    Ok(())
}

/// Remove every role of a member that sits below the bot's top role.
/// The guild owner is never touched.
async fn strip_roles(ctx: &Context, guild_id: GuildId, user_id: UserId, reason: &str) -> Result<usize, Error> {
    let member = guild_id.member(ctx, user_id).await?;
    let bot_id = ctx.cache.current_user().id;
    let bot_member = guild_id.member(ctx, bot_id).await?;
    let bot_top = permissions::top_role_position(ctx, guild_id, &bot_member);

    let removable: Vec<RoleId> = {
        let Some(guild) = ctx.cache.guild(guild_id) else {
            return Ok(0);
        };
        if guild.owner_id == user_id {
            return Ok(0);
        }
        member
            .roles
            .iter()
            .filter(|id| guild.roles.get(id).is_some_and(|r| r.position < bot_top))
            .copied()
            .collect()
    };

    if removable.is_empty() {
        return Ok(0);
    }

    for role_id in &removable {
        ctx.http
            .remove_member_role(guild_id, user_id, *role_id, Some(reason))
            .await?;
    }

    Ok(removable.len())
}

/// Roll back dangerous role grants made by untrusted members
pub async fn guard_role_grant(
    ctx: &Context,
    data: &Arc<Data>,
    old: &Member,
    new: &Member,
) -> Result<(), Error> {
    let guild_id = new.guild_id;

    let granted = {
        let Some(guild) = ctx.cache.guild(guild_id) else {
            return Ok(());
        };
        dangerous_grants(&old.roles, &new.roles, |id| {
            guild
                .roles
                .get(&id)
                .map(|r| r.permissions)
                .unwrap_or_else(Permissions::empty)
        })
    };

    if granted.is_empty() {
        return Ok(());
    }

    let settings = guild_settings::get_or_default(&data.pool, guild_id.get() as i64).await?;
    if !settings.anti_nuke_enabled {
        return Ok(());
    }

    let Some(executor) = find_executor(ctx, guild_id, MemberAction::RoleUpdate, new.user.id).await? else {
        return Ok(());
    };

    if executor == ctx.cache.current_user().id || permissions::is_trusted(data, executor) {
        return Ok(());
    }

    for role_id in &granted {
        ctx.http
            .remove_member_role(guild_id, new.user.id, *role_id, Some("Anti-nuke: dangerous role grant"))
            .await?;
    }

    info!(
        "Rolled back {} dangerous roles granted to {} by {} in {}",
        granted.len(),
        new.user.id,
        executor,
        guild_id
    );

    let roles = granted
        .iter()
        .map(|id| mention_role(id.get()))
        .collect::<Vec<_>>()
        .join(", ");

    audit_log::log_action(
        ctx,
        data,
        guild_id,
        "Anti-Nuke: Role Grant Reverted",
        &format!(
            "{} gave {} a dangerous role",
            mention_user(executor),
            mention_user(new.user.id)
        ),
        ERROR_COLOR,
        &[("Roles", roles)],
    )
    .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(id: RoleId) -> Permissions {
        match id.get() {
            1 => Permissions::ADMINISTRATOR,
            2 => Permissions::SEND_MESSAGES | Permissions::MANAGE_MESSAGES,
            _ => Permissions::SEND_MESSAGES | Permissions::ADD_REACTIONS,
        }
    }

    #[test]
    fn test_only_new_dangerous_roles_are_flagged() {
        let old = vec![RoleId::new(2)];
        let new = vec![RoleId::new(1), RoleId::new(2), RoleId::new(3)];
        assert_eq!(dangerous_grants(&old, &new, perms), vec![RoleId::new(1)]);
    }

    #[test]
    fn test_harmless_grant_is_ignored() {
        let new = vec![RoleId::new(3)];
        assert!(dangerous_grants(&[], &new, perms).is_empty());
    }

    #[test]
    fn test_removals_are_ignored() {
        let old = vec![RoleId::new(1)];
        assert!(dangerous_grants(&old, &[], perms).is_empty());
    }
}
