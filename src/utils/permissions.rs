use serenity::all::{Context, GuildId, Member, Permissions, UserId};

use crate::bot::data::Data;

/// Check if a member has a specific permission. Administrators have every permission
pub fn member_has(ctx: &Context, member: &Member, permission: Permissions) -> bool {
    member
        .permissions(ctx)
        .map(|p| p.administrator() || p.contains(permission))
        .unwrap_or(false)
}

/// Bot owner or whitelisted: exempt from automod and trusted by anti-nuke
pub fn is_trusted(data: &Data, user_id: UserId) -> bool {
    data.settings.is_owner(user_id.get()) || data.whitelist.contains(&user_id.get())
}

/// Highest role position a member holds, 0 for members with only @everyone
pub fn top_role_position(ctx: &Context, guild_id: GuildId, member: &Member) -> u16 {
    ctx.cache
        .guild(guild_id)
        .map(|guild| {
            member
                .roles
                .iter()
                .filter_map(|id| guild.roles.get(id))
                .map(|role| role.position)
                .max()
                .unwrap_or(0)
        })
        .unwrap_or(0)
}
