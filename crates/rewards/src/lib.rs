//! Chill Rewards - Points store, session gate, notifications and config

pub mod config;
pub mod notifications;
pub mod provider;
pub mod session;

pub use config::ClientConfig;
pub use notifications::{Notification, NotificationHandle, NotificationKind, Notifier};
pub use provider::{ChillPointsProvider, RewardsSnapshot};
pub use session::{AuthUser, Session};
