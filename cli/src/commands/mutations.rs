//! Redeem and transfer commands

use crate::state::AppState;
use chill_core::{MutationResponse, Result};
use chill_rewards::{Notification, NotificationKind};

/// Outcome of a mutation plus the notifications it produced
pub struct MutationReport {
    pub outcome: Result<MutationResponse>,
    pub notifications: Vec<Notification>,
}

impl MutationReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Notification lines; the error itself when notifications are switched off
    pub fn to_text(&self) -> String {
        if self.notifications.is_empty() {
            return match &self.outcome {
                Ok(_) => String::new(),
                Err(e) => format!("✗ {}", e.user_message()),
            };
        }
        self.notifications
            .iter()
            .map(|n| {
                let marker = match n.kind {
                    NotificationKind::Success => "✓",
                    NotificationKind::Failure => "✗",
                };
                format!("{} {}: {}", marker, n.title, n.body)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Redeem points; failures are reported through notifications
pub async fn redeem(state: &AppState, points: i64, description: &str) -> MutationReport {
    let outcome = state.provider.redeem(points, description).await;
    MutationReport {
        outcome,
        notifications: state.notifications.drain().await,
    }
}

/// Transfer points to another member by email
pub async fn transfer(
    state: &AppState,
    points: i64,
    recipient_email: &str,
    description: &str,
) -> MutationReport {
    let outcome = state
        .provider
        .transfer(points, recipient_email, description)
        .await;
    MutationReport {
        outcome,
        notifications: state.notifications.drain().await,
    }
}
