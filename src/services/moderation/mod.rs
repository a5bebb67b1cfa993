pub mod actions;
pub mod hierarchy;
