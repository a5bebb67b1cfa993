pub mod recent_joins;
pub mod responder;
pub mod scorer;

pub use recent_joins::RecentJoins;
