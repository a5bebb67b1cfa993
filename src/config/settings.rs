use std::env;

use crate::constants::alt::DEFAULT_JOIN_WINDOW_MINUTES;

pub const DEFAULT_PREFIX: &str = "+";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_GIVEAWAY_STORE_PATH: &str = "giveaways.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub database_url: String,
    /// Bot owner: bypasses every check and manages the white/blacklists
    pub owner_id: Option<u64>,
    pub prefix: String,
    pub guild_id: Option<u64>,
    /// Port for the health/status endpoint
    pub port: u16,
    pub giveaway_store_path: String,
    /// Fallback staff role used by lock/lockdown when a guild has none set
    pub staff_role_id: Option<u64>,
    /// Trailing window of recent joiners compared by the alt scorer
    pub alt_join_window_minutes: i64,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| "DISCORD_TOKEN environment variable not set")?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable not set")?;

        let owner_id = parse_id("OWNER_ID");

        let prefix = env::var("COMMAND_PREFIX")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let guild_id = parse_id("GUILD_ID");

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let giveaway_store_path = env::var("GIVEAWAY_STORE_PATH")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_GIVEAWAY_STORE_PATH.to_string());

        let staff_role_id = parse_id("STAFF_ROLE_ID");

        let alt_join_window_minutes = env::var("ALT_JOIN_WINDOW_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|m: &i64| *m > 0)
            .unwrap_or(DEFAULT_JOIN_WINDOW_MINUTES);

        Ok(Self {
            discord_token,
            database_url,
            owner_id,
            prefix,
            guild_id,
            port,
            giveaway_store_path,
            staff_role_id,
            alt_join_window_minutes,
        })
    }

    /// Check if a user is the configured bot owner
    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_id == Some(user_id)
    }
}

fn parse_id(key: &str) -> Option<u64> {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|id| *id != 0)
}
