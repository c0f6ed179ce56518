//! Boundary checks for server payloads and mutation inputs
//!
//! Server snapshots are checked once when they enter the client so that
//! views can rely on `points >= 0`, `progress` in `[0, 100]` and a
//! consistent tier/next-tier pair.

use crate::{
    Error, ExpiringPoints, RedeemRequest, Result, RewardTransaction, RewardsPointsState,
    TransferRequest,
};
use tracing::warn;

/// Validate a points snapshot, clamping an out-of-range progress value
pub fn validate_points_state(mut state: RewardsPointsState) -> Result<RewardsPointsState> {
    if state.points < 0 {
        return Err(Error::InvalidData(format!(
            "negative points balance: {}",
            state.points
        )));
    }

    match (&state.next_tier, state.tier.name.is_highest()) {
        (None, false) => {
            return Err(Error::InvalidData(format!(
                "tier '{}' has no next tier",
                state.tier.name.as_str()
            )));
        }
        (Some(next), true) => {
            return Err(Error::InvalidData(format!(
                "top tier reports next tier '{}'",
                next.name.as_str()
            )));
        }
        _ => {}
    }

    if !state.progress.is_finite() {
        return Err(Error::InvalidData("progress is not a number".to_string()));
    }

    if !(0.0..=100.0).contains(&state.progress) {
        warn!("Clamping tier progress {} into [0, 100]", state.progress);
        state.progress = state.progress.clamp(0.0, 100.0);
    }

    Ok(state)
}

/// Validate the expiring-points snapshot
pub fn validate_expiring(expiring: ExpiringPoints) -> Result<ExpiringPoints> {
    if expiring.total_expiring < 0 {
        return Err(Error::InvalidData(format!(
            "negative expiring total: {}",
            expiring.total_expiring
        )));
    }
    Ok(expiring)
}

/// Validate a transaction list; point amounts are magnitudes
pub fn validate_transactions(transactions: Vec<RewardTransaction>) -> Result<Vec<RewardTransaction>> {
    if let Some(bad) = transactions.iter().find(|tx| tx.points < 0) {
        return Err(Error::InvalidData(format!(
            "transaction {} has negative points",
            bad.id
        )));
    }
    Ok(transactions)
}

/// Check a redeem request before it is sent
pub fn validate_redeem(request: &RedeemRequest) -> Result<()> {
    check_amount(request.points)?;
    check_description(&request.description)
}

/// Check a transfer request before it is sent
pub fn validate_transfer(request: &TransferRequest) -> Result<()> {
    check_amount(request.points)?;
    if !is_plausible_email(&request.recipient_email) {
        return Err(Error::InvalidData(format!(
            "'{}' is not a valid email address",
            request.recipient_email
        )));
    }
    check_description(&request.description)
}

fn check_amount(points: i64) -> Result<()> {
    if points <= 0 {
        return Err(Error::InvalidData("Points must be positive".to_string()));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(Error::InvalidData("Description is required".to_string()));
    }
    Ok(())
}

/// Shape check only; the server decides whether the recipient exists
fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
