/// Ended giveaways are kept for rerolls this long, then pruned
pub const RETENTION_DAYS: i64 = 7;

/// Custom id of the entry button on every giveaway message
pub const ENTER_BUTTON_ID: &str = "giveaway_enter";
