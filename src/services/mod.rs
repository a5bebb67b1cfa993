pub mod alt;
pub mod audit_log;
pub mod automod;
pub mod coinflip;
pub mod community;
pub mod giveaways;
pub mod moderation;
pub mod security;
pub mod sweeper;
pub mod tickets;
