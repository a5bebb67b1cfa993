pub mod event_handler;
pub mod interaction;
pub mod member;
pub mod message;
