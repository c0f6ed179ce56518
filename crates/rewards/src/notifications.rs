//! User-facing notifications for reward mutations
//!
//! The store emits one notification per redeem/transfer outcome. The
//! default [`NotificationHandle`] logs it and keeps a short feed that a
//! front end can render as toasts.

use async_trait::async_trait;
use chill_core::group_thousands;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const FEED_CAPACITY: usize = 20;

// ─── Types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Failure,
}

/// A toast-style message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

/// The mutation a notification reports on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationAction {
    Redeem { points: i64 },
    Transfer { points: i64, recipient_email: String },
}

impl Notification {
    /// Success message for a completed mutation
    pub fn mutation_succeeded(action: &MutationAction) -> Self {
        let (title, body) = match action {
            MutationAction::Redeem { points } => (
                "Points redeemed",
                format!("{} points have been redeemed.", group_thousands(points.unsigned_abs())),
            ),
            MutationAction::Transfer { points, recipient_email } => (
                "Points transferred",
                format!(
                    "{} points have been sent to {}.",
                    group_thousands(points.unsigned_abs()),
                    recipient_email
                ),
            ),
        };
        Self {
            kind: NotificationKind::Success,
            title: title.to_string(),
            body,
        }
    }

    /// Failure message carrying the server's explanation
    pub fn mutation_failed(action: &MutationAction, message: &str) -> Self {
        let title = match action {
            MutationAction::Redeem { .. } => "Redemption failed",
            MutationAction::Transfer { .. } => "Transfer failed",
        };
        Self {
            kind: NotificationKind::Failure,
            title: title.to_string(),
            body: message.to_string(),
        }
    }
}

/// Receives notifications emitted by the store
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

// ─── Config ──────────────────────────────────────────────────────────

/// Per-category notification toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    /// Master switch
    pub enabled: bool,
    pub mutation_success: bool,
    pub mutation_failure: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mutation_success: true,
            mutation_failure: true,
        }
    }
}

impl NotificationConfig {
    fn allows(&self, kind: NotificationKind) -> bool {
        self.enabled
            && match kind {
                NotificationKind::Success => self.mutation_success,
                NotificationKind::Failure => self.mutation_failure,
            }
    }
}

// ─── Handle ──────────────────────────────────────────────────────────

/// Shared handle that logs notifications and keeps the most recent ones
#[derive(Clone)]
pub struct NotificationHandle {
    config: Arc<RwLock<NotificationConfig>>,
    feed: Arc<RwLock<VecDeque<Notification>>>,
}

impl NotificationHandle {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            feed: Arc::new(RwLock::new(VecDeque::with_capacity(FEED_CAPACITY))),
        }
    }

    /// Update the notification configuration
    pub async fn set_config(&self, config: NotificationConfig) {
        *self.config.write().await = config;
    }

    /// Get the current notification configuration
    pub async fn get_config(&self) -> NotificationConfig {
        self.config.read().await.clone()
    }

    /// Most recent notifications, oldest first
    pub async fn recent(&self) -> Vec<Notification> {
        self.feed.read().await.iter().cloned().collect()
    }

    /// Remove and return everything in the feed
    pub async fn drain(&self) -> Vec<Notification> {
        self.feed.write().await.drain(..).collect()
    }
}

impl Default for NotificationHandle {
    fn default() -> Self {
        Self::new(NotificationConfig::default())
    }
}

#[async_trait]
impl Notifier for NotificationHandle {
    async fn notify(&self, notification: Notification) {
        let cfg = self.config.read().await;
        if !cfg.allows(notification.kind) {
            debug!("Notification suppressed: {}", notification.title);
            return;
        }
        drop(cfg);

        match notification.kind {
            NotificationKind::Success => info!("{} - {}", notification.title, notification.body),
            NotificationKind::Failure => warn!("{} - {}", notification.title, notification.body),
        }

        let mut feed = self.feed.write().await;
        if feed.len() == FEED_CAPACITY {
            feed.pop_front();
        }
        feed.push_back(notification);
    }
}

// ─── Recording ───────────────────────────────────────────────────────

/// Collects every notification; for tests and headless callers
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.notifications().iter().filter(|n| n.kind == kind).count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) {
        if let Ok(mut list) = self.received.lock() {
            list.push(notification);
        }
    }
}
