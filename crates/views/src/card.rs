//! Rewards card: balance, tier, progress, expiry warning and benefits
//!
//! A pure projection of store state; no I/O and no mutation.

use crate::i18n::{format_date, Translate};
use chill_core::{group_thousands, ExpiringPoints, RewardsPointsState, TierName};
use chrono::{DateTime, Utc};

const BAR_WIDTH: usize = 20;

/// What the card is given to render
#[derive(Debug, Clone, Copy, Default)]
pub struct CardInput<'a> {
    pub rewards: Option<&'a RewardsPointsState>,
    pub expiring: Option<&'a ExpiringPoints>,
    pub points_loading: bool,
    pub expiring_loading: bool,
    pub points_error: bool,
}

/// Tier name with its display label
#[derive(Debug, Clone, PartialEq)]
pub struct TierBadge {
    pub name: TierName,
    pub label: String,
}

/// Progress toward the next tier
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressBar {
    /// 0-100
    pub percent: f64,
    pub next_tier: TierBadge,
    pub points_remaining: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpiryWarning {
    pub total_expiring: i64,
    pub nearest_expiry: Option<DateTime<Utc>>,
    pub message: String,
}

/// Populated card contents
#[derive(Debug, Clone, PartialEq)]
pub struct CardModel {
    pub title: String,
    pub balance: i64,
    pub balance_label: String,
    pub tier: TierBadge,
    pub progress: Option<ProgressBar>,
    pub expiry_warning: Option<ExpiryWarning>,
    pub benefits_title: String,
    pub benefits: Vec<String>,
    pub statistics_label: String,
}

/// The card's render states
#[derive(Debug, Clone, PartialEq)]
pub enum RewardsCardView {
    Loading,
    Error { message: String },
    Empty { title: String, message: String },
    Populated(CardModel),
}

pub struct RewardsCard;

impl RewardsCard {
    /// Pick the render state and build its contents
    pub fn render<T: Translate + ?Sized>(input: CardInput<'_>, t: &T) -> RewardsCardView {
        if input.points_loading || (input.expiring_loading && input.rewards.is_none()) {
            return RewardsCardView::Loading;
        }

        let Some(rewards) = input.rewards else {
            if input.points_error {
                return RewardsCardView::Error {
                    message: t.t(
                        "rewards.card.error",
                        "We couldn't load your Chill Points right now.",
                        &[],
                    ),
                };
            }
            return RewardsCardView::Empty {
                title: t.t("rewards.card.emptyTitle", "No rewards yet", &[]),
                message: t.t(
                    "rewards.card.emptyMessage",
                    "Book your first stay to start earning Chill Points.",
                    &[],
                ),
            };
        };

        RewardsCardView::Populated(Self::populated(rewards, input.expiring, t))
    }

    fn populated<T: Translate + ?Sized>(
        rewards: &RewardsPointsState,
        expiring: Option<&ExpiringPoints>,
        t: &T,
    ) -> CardModel {
        let balance = group_thousands(rewards.points.unsigned_abs());

        let progress = rewards.next_tier.as_ref().map(|next| {
            let remaining = rewards.points_to_next_tier().unwrap_or(0);
            let next_badge = tier_badge(next.name, t);
            let remaining_text = group_thousands(remaining.unsigned_abs());
            ProgressBar {
                percent: rewards.progress.clamp(0.0, 100.0),
                label: t.t(
                    "rewards.card.progress",
                    "{points} points to {tier}",
                    &[("points", &remaining_text), ("tier", &next_badge.label)],
                ),
                next_tier: next_badge,
                points_remaining: remaining,
            }
        });

        let expiry_warning = expiring.filter(|e| e.has_warning()).map(|e| {
            let total = group_thousands(e.total_expiring.unsigned_abs());
            let message = match &e.nearest_expiry {
                Some(date) => {
                    let date = format_date(date, t.locale());
                    t.t(
                        "rewards.card.expiringOn",
                        "{points} points expire on {date}",
                        &[("points", &total), ("date", &date)],
                    )
                }
                None => t.t(
                    "rewards.card.expiringSoon",
                    "{points} points expire soon",
                    &[("points", &total)],
                ),
            };
            ExpiryWarning {
                total_expiring: e.total_expiring,
                nearest_expiry: e.nearest_expiry,
                message,
            }
        });

        let stats = &rewards.statistics;
        let earned = group_thousands(stats.total_earned.unsigned_abs());
        let redeemed = group_thousands(stats.total_redeemed.unsigned_abs());
        let count = stats.transactions_count.to_string();

        CardModel {
            title: t.t("rewards.card.title", "Chill Points", &[]),
            balance: rewards.points,
            balance_label: t.t("rewards.card.balance", "{points} points", &[("points", &balance)]),
            tier: tier_badge(rewards.tier.name, t),
            progress,
            expiry_warning,
            benefits_title: t.t("rewards.card.benefits", "Your benefits", &[]),
            benefits: rewards.tier.benefits.clone(),
            statistics_label: t.t(
                "rewards.card.statistics",
                "{earned} earned, {redeemed} redeemed across {count} transactions",
                &[("earned", &earned), ("redeemed", &redeemed), ("count", &count)],
            ),
        }
    }
}

fn tier_badge<T: Translate + ?Sized>(name: TierName, t: &T) -> TierBadge {
    let default = match name {
        TierName::Silver => "Silver",
        TierName::Gold => "Gold",
        TierName::Platinum => "Platinum",
    };
    TierBadge {
        name,
        label: t.t(&format!("rewards.tier.{}", name.as_str()), default, &[]),
    }
}

impl RewardsCardView {
    /// Plain-text rendering for terminals
    pub fn to_text(&self) -> String {
        match self {
            RewardsCardView::Loading => "Loading rewards...".to_string(),
            RewardsCardView::Error { message } => message.clone(),
            RewardsCardView::Empty { title, message } => format!("{}\n{}", title, message),
            RewardsCardView::Populated(card) => card.to_text(),
        }
    }
}

impl CardModel {
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!("{} [{}]", self.title, self.tier.label),
            self.balance_label.clone(),
        ];

        if let Some(progress) = &self.progress {
            let filled = ((progress.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
            let filled = filled.min(BAR_WIDTH);
            lines.push(format!(
                "[{}{}] {:.0}%  {}",
                "#".repeat(filled),
                "-".repeat(BAR_WIDTH - filled),
                progress.percent,
                progress.label
            ));
        }

        if let Some(warning) = &self.expiry_warning {
            lines.push(format!("! {}", warning.message));
        }

        if !self.benefits.is_empty() {
            lines.push(format!("{}:", self.benefits_title));
            lines.extend(self.benefits.iter().map(|b| format!("  - {}", b)));
        }

        lines.push(self.statistics_label.clone());
        lines.join("\n")
    }
}
