pub mod invites;
pub mod welcome;
