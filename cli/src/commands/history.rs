//! Reward history command

use crate::state::AppState;
use anyhow::Context;
use chill_views::{RewardHistoryTable, TypeFilter};
use tracing::debug;

/// Render the filtered transaction history as text
pub async fn show_history(
    state: &AppState,
    kind: Option<&str>,
    search: Option<&str>,
) -> anyhow::Result<String> {
    let transactions = state
        .provider
        .transactions()
        .await
        .context("Failed to load reward transactions")?;

    let mut table = RewardHistoryTable::new();
    if let Some(kind) = kind {
        table.set_type(kind.parse::<TypeFilter>()?);
    }
    if let Some(search) = search {
        table.set_search(search);
    }

    let rows = table.rows(&transactions, state.catalog.as_ref());
    let summary = RewardHistoryTable::summary(&rows);
    debug!("History summary: {:?}", summary);

    let mut out = RewardHistoryTable::to_text(&rows, state.catalog.as_ref());
    if summary.count > 0 {
        out.push_str(&format!(
            "\n\n{} transactions, +{} / -{}",
            summary.count, summary.credited, summary.debited
        ));
    }
    Ok(out)
}
