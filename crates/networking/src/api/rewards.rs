//! The rewards endpoints as an async trait

use crate::ChillClient;
use async_trait::async_trait;
use chill_core::{
    ExpiringPoints, MutationResponse, RedeemRequest, Result, RewardTransaction,
    RewardsPointsState, TransferRequest,
};

/// Operations the rewards backend exposes
#[async_trait]
pub trait RewardsApi: Send + Sync {
    /// `GET /api/rewards/points`
    async fn get_points(&self) -> Result<RewardsPointsState>;

    /// `GET /api/rewards/transactions`
    async fn get_transactions(&self) -> Result<Vec<RewardTransaction>>;

    /// `GET /api/rewards/expiring`
    async fn get_expiring(&self) -> Result<ExpiringPoints>;

    /// `POST /api/rewards/redeem`
    async fn redeem(&self, request: &RedeemRequest) -> Result<MutationResponse>;

    /// `POST /api/rewards/transfer`
    async fn transfer(&self, request: &TransferRequest) -> Result<MutationResponse>;
}

#[async_trait]
impl RewardsApi for ChillClient {
    async fn get_points(&self) -> Result<RewardsPointsState> {
        ChillClient::get_points(self).await
    }

    async fn get_transactions(&self) -> Result<Vec<RewardTransaction>> {
        ChillClient::get_transactions(self).await
    }

    async fn get_expiring(&self) -> Result<ExpiringPoints> {
        ChillClient::get_expiring(self).await
    }

    async fn redeem(&self, request: &RedeemRequest) -> Result<MutationResponse> {
        ChillClient::redeem(self, request).await
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<MutationResponse> {
        ChillClient::transfer(self, request).await
    }
}
