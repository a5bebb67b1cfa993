//! Fixed weights and cut points for the alt-account scorer.

/// Accounts younger than this many days score [`YOUNG_ACCOUNT_WEIGHT`]
pub const YOUNG_ACCOUNT_DAYS: i64 = 3;
pub const YOUNG_ACCOUNT_WEIGHT: u32 = 3;

/// Accounts younger than this many days (but not young) score [`NEW_ACCOUNT_WEIGHT`]
pub const NEW_ACCOUNT_DAYS: i64 = 7;
pub const NEW_ACCOUNT_WEIGHT: u32 = 1;

pub const NO_AVATAR_WEIGHT: u32 = 1;
pub const NAME_PATTERN_WEIGHT: u32 = 1;

/// Minimum normalized similarity for a name to count as a lookalike
pub const SIMILARITY_THRESHOLD: f64 = 0.75;
pub const SIMILAR_NAME_WEIGHT: u32 = 2;

/// Level cut points: below MEDIUM is LOW, and so on
pub const MEDIUM_SCORE: u32 = 2;
pub const HIGH_SCORE: u32 = 4;
pub const CRITICAL_SCORE: u32 = 6;

/// Score at which an alert is posted to the log channel
pub const ALERT_SCORE: u32 = MEDIUM_SCORE;
/// Score at which the member is timed out automatically
pub const TIMEOUT_SCORE: u32 = CRITICAL_SCORE;
/// Length of the automatic timeout
pub const TIMEOUT_HOURS: i64 = 24;

pub const DEFAULT_JOIN_WINDOW_MINUTES: i64 = 30;
