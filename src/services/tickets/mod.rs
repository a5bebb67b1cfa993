pub mod channels;
pub mod lifecycle;

pub use lifecycle::{TicketError, TicketState};
