pub mod enforcer;
pub mod filters;
pub mod violations;
pub mod window;

pub use violations::ViolationCache;
pub use window::RateWindow;
