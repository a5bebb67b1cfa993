pub mod alt_detection;
pub mod guild_settings;
pub mod invites;
pub mod lists;
pub mod ticket_roles;
pub mod tickets;
pub mod violations;
pub mod warnings;
