use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Giveaway {
    pub message_id: u64,
    pub channel_id: u64,
    pub guild_id: u64,
    pub host_id: u64,
    pub prize: String,
    pub winner_count: u32,
    pub entries: Vec<u64>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ended: bool,
    #[serde(default)]
    pub winners: Vec<u64>,
}

impl Giveaway {
    pub fn has_entered(&self, user_id: u64) -> bool {
        self.entries.contains(&user_id)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GiveawayError {
    #[error("This giveaway no longer exists")]
    NotFound,

    #[error("This giveaway has already ended")]
    Ended,

    #[error("You have already entered this giveaway")]
    AlreadyEntered,

    #[error("Nobody entered that giveaway")]
    NoEntries,

    #[error("Duration must be at least 1 minute and within range")]
    InvalidDuration,

    #[error("There must be at least 1 winner")]
    InvalidWinnerCount,
}
