pub mod alt;
pub mod automod;
pub mod embeds;
pub mod giveaways;
pub mod security;
pub mod tickets;
