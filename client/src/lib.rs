pub mod clock;
pub mod config;
pub mod format;
pub mod keys;
pub mod model;
pub mod notify;
pub mod subscription;
pub mod wallet;

pub use config::SubscriptionConfig;
pub use subscription::view_model::{Outcome, SubscriptionViewModel};
