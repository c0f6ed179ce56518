//! Rewards card command

use crate::state::AppState;
use chill_views::{CardInput, RewardsCard, RewardsCardView};

/// Load reward state and render the card
pub async fn show_card(state: &AppState) -> RewardsCardView {
    let snapshot = state.provider.load().await;

    let input = CardInput {
        rewards: snapshot.rewards(),
        expiring: snapshot.expiring_points(),
        points_loading: snapshot.points_loading(),
        expiring_loading: snapshot.expiring_loading(),
        points_error: snapshot.points_error(),
    };
    RewardsCard::render(input, state.catalog.as_ref())
}
