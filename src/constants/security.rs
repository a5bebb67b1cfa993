use std::time::Duration;

use serenity::all::Permissions;

/// Joins within [`RAID_JOIN_WINDOW`] that trigger raid protection
pub const RAID_JOIN_THRESHOLD: usize = 10;
pub const RAID_JOIN_WINDOW: Duration = Duration::from_secs(10);

/// Delay before reading the audit log after a bot joins
pub const AUDIT_LOG_DELAY: Duration = Duration::from_secs(1);

/// Name of the log channel created when a guild has none configured
pub const LOG_CHANNEL_NAME: &str = "security-logs";

/// Permissions whose grant by an untrusted member is rolled back
pub fn dangerous_permissions() -> Permissions {
    Permissions::ADMINISTRATOR
        | Permissions::KICK_MEMBERS
        | Permissions::BAN_MEMBERS
        | Permissions::MANAGE_CHANNELS
        | Permissions::MANAGE_GUILD
        | Permissions::MANAGE_ROLES
        | Permissions::MANAGE_WEBHOOKS
        | Permissions::MANAGE_MESSAGES
        | Permissions::MENTION_EVERYONE
}
