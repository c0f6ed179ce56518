//! Chill Views - Presentation models for the rewards card and history table
//!
//! Everything here is a pure function of store snapshots plus local
//! filter state.

pub mod card;
pub mod history;
pub mod i18n;

pub use card::{CardInput, CardModel, RewardsCard, RewardsCardView};
pub use history::{
    filter_transactions, Direction, HistoryFilter, HistoryRow, HistorySummary, RewardHistoryTable,
    TypeFilter,
};
pub use i18n::{Catalog, Translate};
