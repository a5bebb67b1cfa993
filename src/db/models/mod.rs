mod alt_detection;
mod guild_settings;
mod invite;
mod list_entry;
mod ticket;
mod violation;
mod warning;

pub use alt_detection::AltDetection;
pub use guild_settings::{GuildSettings, SettingsToggle};
pub use invite::{InviteJoin, InviteSnapshot};
pub use list_entry::{ListEntry, UserList};
pub use ticket::{MmTier, Ticket, TicketKind, TradeDetails};
pub use violation::Violation;
pub use warning::Warning;
