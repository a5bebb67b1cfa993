use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GuildSettings {
    pub guild_id: i64,
    pub log_channel_id: Option<i64>,
    pub staff_role_id: Option<i64>,
    pub unverified_role_id: Option<i64>,
    pub proof_channel_id: Option<i64>,
    pub welcome_channel_id: Option<i64>,
    pub leave_channel_id: Option<i64>,
    pub welcome_message: Option<String>,
    pub leave_message: Option<String>,
    pub invite_tracker_channel_id: Option<i64>,
    pub automod_enabled: bool,
    pub anti_raid_enabled: bool,
    pub anti_nuke_enabled: bool,
    pub invite_tracking_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuildSettings {
    /// Settings used for a guild that has never been configured
    pub fn defaults(guild_id: i64) -> Self {
        let now = Utc::now();
        Self {
            guild_id,
            log_channel_id: None,
            staff_role_id: None,
            unverified_role_id: None,
            proof_channel_id: None,
            welcome_channel_id: None,
            leave_channel_id: None,
            welcome_message: None,
            leave_message: None,
            invite_tracker_channel_id: None,
            automod_enabled: true,
            anti_raid_enabled: true,
            anti_nuke_enabled: true,
            invite_tracking_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// On/off switches stored per guild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsToggle {
    Automod,
    AntiRaid,
    AntiNuke,
    InviteTracking,
}

impl SettingsToggle {
    pub fn column(&self) -> &'static str {
        match self {
            SettingsToggle::Automod => "automod_enabled",
            SettingsToggle::AntiRaid => "anti_raid_enabled",
            SettingsToggle::AntiNuke => "anti_nuke_enabled",
            SettingsToggle::InviteTracking => "invite_tracking_enabled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingsToggle::Automod => "auto-moderation",
            SettingsToggle::AntiRaid => "anti-raid",
            SettingsToggle::AntiNuke => "anti-nuke",
            SettingsToggle::InviteTracking => "invite tracking",
        }
    }
}
