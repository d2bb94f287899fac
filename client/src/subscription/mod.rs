pub mod active;
pub mod classify;
pub mod tiers;
pub mod view;
pub mod view_model;

pub use active::{derive_active_subscription, ActiveSubscription};
pub use classify::{classify, ErrorClass};
pub use tiers::{Tier, TierUnit};
pub use view::{ActiveCard, SubscriptionView, TierForm, TierOption};
