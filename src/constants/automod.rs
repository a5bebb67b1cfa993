use std::time::Duration;

/// Messages within [`SPAM_WINDOW`] that count as spam
pub const SPAM_THRESHOLD: usize = 7;
pub const SPAM_WINDOW: Duration = Duration::from_secs(4);
/// How many recent channel messages are scanned when purging a spammer
pub const SPAM_PURGE_SCAN: u8 = 20;

/// Escalating spam timeouts in minutes, indexed by violation count (1-based)
pub const SPAM_TIMEOUT_MINUTES: &[i64] = &[5, 15, 30, 60, 180];

pub const PROFANITY_TIMEOUT_MINUTES: i64 = 10;

/// User plus role mentions in a single message
pub const MENTION_LIMIT: usize = 5;
pub const MENTION_TIMEOUT_MINUTES: i64 = 15;

/// Link-bearing messages within [`LINK_WINDOW`]
pub const LINK_LIMIT: usize = 3;
pub const LINK_WINDOW: Duration = Duration::from_secs(10);
pub const LINK_TIMEOUT_MINUTES: i64 = 15;

pub const CAPS_MIN_LENGTH: usize = 20;
pub const CAPS_RATIO: f64 = 0.7;

pub const BLACKLIST_TIMEOUT_MINUTES: i64 = 60;

/// How long warning messages stay before the bot deletes them
pub const WARNING_LIFETIME: Duration = Duration::from_secs(5);

/// Interval of the sweep that prunes idle rate windows
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);
/// Windows idle for longer than this are dropped by the sweep
pub const CLEANUP_IDLE: Duration = Duration::from_secs(60 * 60);

/// Longest timeout Discord accepts (28 days)
pub const MAX_TIMEOUT_MINUTES: i64 = 40320;

/// Get the spam timeout for a violation count
pub fn spam_timeout_minutes(violations: u32) -> i64 {
    let index = (violations.max(1) as usize - 1).min(SPAM_TIMEOUT_MINUTES.len() - 1);
    SPAM_TIMEOUT_MINUTES[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spam_timeout_escalation() {
        assert_eq!(spam_timeout_minutes(1), 5);
        assert_eq!(spam_timeout_minutes(2), 15);
        assert_eq!(spam_timeout_minutes(4), 60);
        assert_eq!(spam_timeout_minutes(5), 180);
        // Anything past the table stays at the max
        assert_eq!(spam_timeout_minutes(42), 180);
        // Zero is treated as a first offence
        assert_eq!(spam_timeout_minutes(0), 5);
    }
}
