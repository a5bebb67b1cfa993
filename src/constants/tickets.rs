use std::time::Duration;

/// Every ticket channel name starts with this
pub const TICKET_PREFIX: &str = "ticket-";

/// Suffix appended to a ticket channel name while it is claimed
pub const CLAIMED_SUFFIX: &str = "-claimed";

/// Category that ticket channels are created under
pub const TICKET_CATEGORY_NAME: &str = "tickets";

/// Delay between the close notice and the channel deletion
pub const CLOSE_DELAY: Duration = Duration::from_secs(5);

/// Discord limit for channel names
pub const MAX_CHANNEL_NAME_LEN: usize = 100;
