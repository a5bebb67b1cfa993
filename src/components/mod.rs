pub mod giveaway_entry;
pub mod ticket_controls;
pub mod ticket_panel;
