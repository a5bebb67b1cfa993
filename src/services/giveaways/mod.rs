pub mod draw;
pub mod model;
pub mod runner;
pub mod store;

pub use model::{Giveaway, GiveawayError};
pub use store::GiveawayStore;
