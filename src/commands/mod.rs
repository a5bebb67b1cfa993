pub mod checks;
pub mod coinflip;
pub mod community;
pub mod config;
pub mod giveaways;
pub mod info;
pub mod lists;
pub mod moderation;
pub mod security;
pub mod tickets;
