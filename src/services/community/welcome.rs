use serenity::all::{ChannelId, Context, CreateMessage, GuildId, Member, User, UserId};
use tracing::error;

use crate::db::models::GuildSettings;
use crate::utils::formatting::mention_user;

pub const DEFAULT_WELCOME: &str = "Welcome {user} to **{server}**!";
pub const DEFAULT_LEAVE: &str = "**{user}** just left us... rip";

/// Fill a welcome template. `{inviter}` becomes "unknown" when not tracked
pub fn render_welcome(
    template: Option<&str>,
    user: &str,
    server: &str,
    count: u64,
    inviter: Option<&str>,
) -> String {
    template
        .unwrap_or(DEFAULT_WELCOME)
        .replace("{user}", user)
        .replace("{server}", server)
        .replace("{count}", &count.to_string())
        .replace("{inviter}", inviter.unwrap_or("unknown"))
}

pub fn render_leave(template: Option<&str>, user: &str, server: &str, count: u64) -> String {
    template
        .unwrap_or(DEFAULT_LEAVE)
        .replace("{user}", user)
        .replace("{server}", server)
        .replace("{count}", &count.to_string())
}

fn guild_name_and_count(ctx: &Context, guild_id: GuildId) -> (String, u64) {
    ctx.cache
        .guild(guild_id)
        .map(|g| (g.name.clone(), g.member_count))
        .unwrap_or_else(|| ("the server".to_string(), 0))
}

pub async fn send_welcome(ctx: &Context, settings: &GuildSettings, member: &Member, inviter: Option<UserId>) {
    let Some(channel) = settings.welcome_channel_id else {
        return;
    };

    let (server, count) = guild_name_and_count(ctx, member.guild_id);
    let inviter = inviter.map(mention_user);
    let content = render_welcome(
        settings.welcome_message.as_deref(),
        &mention_user(member.user.id),
        &server,
        count,
        inviter.as_deref(),
    );

    if let Err(e) = ChannelId::new(channel as u64)
        .send_message(ctx, CreateMessage::new().content(content))
        .await
    {
        error!("Failed to send welcome message: {:?}", e);
    }
}

pub async fn send_leave(ctx: &Context, settings: &GuildSettings, guild_id: GuildId, user: &User) {
    let Some(channel) = settings.leave_channel_id else {
        return;
    };

    let (server, count) = guild_name_and_count(ctx, guild_id);
    let content = render_leave(settings.leave_message.as_deref(), &user.name, &server, count);

    if let Err(e) = ChannelId::new(channel as u64)
        .send_message(ctx, CreateMessage::new().content(content))
        .await
    {
        error!("Failed to send leave message: {:?}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_welcome() {
        let text = render_welcome(None, "<@1>", "Cove", 12, None);
        assert_eq!(text, "Welcome <@1> to **Cove**!");
    }

    #[test]
    fn test_custom_welcome_placeholders() {
        let text = render_welcome(
            Some("{user} is member #{count}, invited by {inviter}"),
            "<@1>",
            "Cove",
            12,
            Some("<@2>"),
        );
        assert_eq!(text, "<@1> is member #12, invited by <@2>");

        let untracked = render_welcome(Some("by {inviter}"), "<@1>", "Cove", 12, None);
        assert_eq!(untracked, "by unknown");
    }

    #[test]
    fn test_leave_uses_plain_name() {
        assert_eq!(render_leave(None, "sam", "Cove", 11), "**sam** just left us... rip");
        assert_eq!(
            render_leave(Some("{user} left {server}, {count} remain"), "sam", "Cove", 11),
            "sam left Cove, 11 remain"
        );
    }
}
