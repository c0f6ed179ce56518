//! Chill Points store
//!
//! Owns one cache slot per rewards endpoint and is the only writer to
//! them. Consumers read immutable snapshots; redeem and transfer change
//! state exclusively by invalidating and refetching the affected slots.

use crate::notifications::{MutationAction, Notification, Notifier};
use crate::session::{AuthUser, Session};
use chill_cache::{QueryKey, QuerySlot, QuerySnapshot};
use chill_core::validation::{
    validate_expiring, validate_points_state, validate_redeem, validate_transactions,
    validate_transfer,
};
use chill_core::{
    Error, ExpiringPoints, MutationResponse, RedeemRequest, Result, RewardTransaction,
    RewardsPointsState, TransferRequest,
};
use chill_networking::{endpoints, RewardsApi};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const POINTS_KEY: QueryKey = QueryKey::new(endpoints::POINTS);
pub const TRANSACTIONS_KEY: QueryKey = QueryKey::new(endpoints::TRANSACTIONS);
pub const EXPIRING_KEY: QueryKey = QueryKey::new(endpoints::EXPIRING);

/// Immutable view of all reward state at one point in time
#[derive(Debug, Clone)]
pub struct RewardsSnapshot {
    pub authenticated: bool,
    pub points: QuerySnapshot<RewardsPointsState>,
    pub transactions: QuerySnapshot<Vec<RewardTransaction>>,
    pub expiring: QuerySnapshot<ExpiringPoints>,
}

impl RewardsSnapshot {
    pub fn rewards(&self) -> Option<&RewardsPointsState> {
        self.points.data.as_deref()
    }

    pub fn expiring_points(&self) -> Option<&ExpiringPoints> {
        self.expiring.data.as_deref()
    }

    /// Transaction list; empty when nothing has been fetched
    pub fn transactions(&self) -> Arc<Vec<RewardTransaction>> {
        self.transactions.data.clone().unwrap_or_default()
    }

    /// First load in flight; background refetches keep showing cached data
    pub fn points_loading(&self) -> bool {
        self.points.is_loading() && self.points.data.is_none()
    }

    pub fn expiring_loading(&self) -> bool {
        self.expiring.is_loading() && self.expiring.data.is_none()
    }

    pub fn transactions_loading(&self) -> bool {
        self.transactions.is_loading() && self.transactions.data.is_none()
    }

    /// Generic "fetch failed" flag for the balance query
    pub fn points_error(&self) -> bool {
        self.points.is_error()
    }
}

/// Reward state container shared by every consumer in a session
///
/// Cloning is cheap; clones share the same slots.
#[derive(Clone)]
pub struct ChillPointsProvider {
    api: Arc<dyn RewardsApi>,
    notifier: Arc<dyn Notifier>,
    session: Arc<Session>,
    points: Arc<QuerySlot<RewardsPointsState>>,
    transactions: Arc<QuerySlot<Vec<RewardTransaction>>>,
    expiring: Arc<QuerySlot<ExpiringPoints>>,
}

impl ChillPointsProvider {
    /// Create a store with no signed-in user
    pub fn new(api: Arc<dyn RewardsApi>, notifier: Arc<dyn Notifier>, stale_after: Duration) -> Self {
        Self {
            api,
            notifier,
            session: Arc::new(Session::new()),
            points: Arc::new(QuerySlot::new(POINTS_KEY, stale_after)),
            transactions: Arc::new(QuerySlot::new(TRANSACTIONS_KEY, stale_after)),
            expiring: Arc::new(QuerySlot::new(EXPIRING_KEY, stale_after)),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    // ─── Session ─────────────────────────────────────────────────

    /// Sign a user in; cached data from any previous user is dropped
    pub async fn login(&self, user: AuthUser) {
        info!("Rewards session started for {}", user.id);
        self.reset_slots();
        self.session.sign_in(user).await;
    }

    /// Sign out and discard every cached snapshot
    pub async fn logout(&self) {
        if let Some(user) = self.session.sign_out().await {
            info!("Rewards session ended for {}", user.id);
        }
        self.reset_slots();
    }

    fn reset_slots(&self) {
        self.points.reset();
        self.transactions.reset();
        self.expiring.reset();
    }

    // ─── Queries ─────────────────────────────────────────────────

    async fn fetch_points(&self) -> Result<RewardsPointsState> {
        validate_points_state(self.api.get_points().await?)
    }

    async fn fetch_transactions(&self) -> Result<Vec<RewardTransaction>> {
        validate_transactions(self.api.get_transactions().await?)
    }

    async fn fetch_expiring(&self) -> Result<ExpiringPoints> {
        validate_expiring(self.api.get_expiring().await?)
    }

    /// Balance, tier and progress; `None` without a signed-in user
    pub async fn points(&self) -> Result<Option<Arc<RewardsPointsState>>> {
        if !self.authenticated().await {
            return Ok(None);
        }
        self.points.ensure_with(|| self.fetch_points()).await
    }

    /// Transaction history in server order; empty without a signed-in user
    pub async fn transactions(&self) -> Result<Arc<Vec<RewardTransaction>>> {
        if !self.authenticated().await {
            return Ok(Arc::default());
        }
        let list = self.transactions.ensure_with(|| self.fetch_transactions()).await?;
        Ok(list.unwrap_or_default())
    }

    /// Points close to expiry; `None` without a signed-in user
    pub async fn expiring(&self) -> Result<Option<Arc<ExpiringPoints>>> {
        if !self.authenticated().await {
            return Ok(None);
        }
        self.expiring.ensure_with(|| self.fetch_expiring()).await
    }

    /// Refetch the balance regardless of freshness
    pub async fn refresh_points(&self) -> Result<Option<Arc<RewardsPointsState>>> {
        if !self.authenticated().await {
            return Ok(None);
        }
        self.points.fetch_with(|| self.fetch_points()).await.map(Some)
    }

    /// Refetch the transaction list regardless of freshness
    pub async fn refresh_transactions(&self) -> Result<Arc<Vec<RewardTransaction>>> {
        if !self.authenticated().await {
            return Ok(Arc::default());
        }
        self.transactions.fetch_with(|| self.fetch_transactions()).await
    }

    /// Refetch the expiring-points summary regardless of freshness
    pub async fn refresh_expiring(&self) -> Result<Option<Arc<ExpiringPoints>>> {
        if !self.authenticated().await {
            return Ok(None);
        }
        self.expiring.fetch_with(|| self.fetch_expiring()).await.map(Some)
    }

    /// Refetch all three queries; each fails independently
    pub async fn refresh_all(&self) -> RewardsSnapshot {
        let (points, transactions, expiring) = tokio::join!(
            self.refresh_points(),
            self.refresh_transactions(),
            self.refresh_expiring()
        );
        log_query_error(POINTS_KEY, points.err());
        log_query_error(TRANSACTIONS_KEY, transactions.err());
        log_query_error(EXPIRING_KEY, expiring.err());
        self.snapshot().await
    }

    /// Initial load: fetch whatever is missing, concurrently
    pub async fn load(&self) -> RewardsSnapshot {
        let (points, transactions, expiring) =
            tokio::join!(self.points(), self.transactions(), self.expiring());
        log_query_error(POINTS_KEY, points.err());
        log_query_error(TRANSACTIONS_KEY, transactions.err());
        log_query_error(EXPIRING_KEY, expiring.err());
        self.snapshot().await
    }

    /// Window/tab regained focus: refetch stale or expired slots only
    pub async fn on_focus(&self) -> RewardsSnapshot {
        debug!("Focus regained, revalidating reward queries");
        self.load().await
    }

    /// Current state of every slot
    pub async fn snapshot(&self) -> RewardsSnapshot {
        RewardsSnapshot {
            authenticated: self.authenticated().await,
            points: self.points.snapshot(),
            transactions: self.transactions.snapshot(),
            expiring: self.expiring.snapshot(),
        }
    }

    // ─── Mutations ───────────────────────────────────────────────

    /// Redeem points.
    ///
    /// Success invalidates and refetches the balance and history; failure
    /// leaves cached state untouched. Either way one notification is sent.
    pub async fn redeem(&self, points: i64, description: &str) -> Result<MutationResponse> {
        let request = RedeemRequest {
            points,
            description: description.trim().to_string(),
        };
        let action = MutationAction::Redeem { points };

        let outcome = match self.precheck(validate_redeem(&request)).await {
            Ok(()) => self.api.redeem(&request).await,
            Err(e) => Err(e),
        };
        self.settle(action, outcome).await
    }

    /// Transfer points to another member; same contract as [`redeem`](Self::redeem)
    pub async fn transfer(
        &self,
        points: i64,
        recipient_email: &str,
        description: &str,
    ) -> Result<MutationResponse> {
        let request = TransferRequest {
            points,
            recipient_email: recipient_email.trim().to_string(),
            description: description.trim().to_string(),
        };
        let action = MutationAction::Transfer {
            points,
            recipient_email: request.recipient_email.clone(),
        };

        let outcome = match self.precheck(validate_transfer(&request)).await {
            Ok(()) => self.api.transfer(&request).await,
            Err(e) => Err(e),
        };
        self.settle(action, outcome).await
    }

    async fn precheck(&self, input: Result<()>) -> Result<()> {
        if !self.authenticated().await {
            return Err(Error::NotAuthenticated);
        }
        input
    }

    async fn settle(
        &self,
        action: MutationAction,
        outcome: Result<MutationResponse>,
    ) -> Result<MutationResponse> {
        match outcome {
            Ok(response) => {
                info!("{:?} succeeded", action);
                self.points.invalidate();
                self.transactions.invalidate();

                let (points, transactions) =
                    tokio::join!(self.refresh_points(), self.refresh_transactions());
                log_query_error(POINTS_KEY, points.err());
                log_query_error(TRANSACTIONS_KEY, transactions.err());

                self.notifier
                    .notify(Notification::mutation_succeeded(&action))
                    .await;
                Ok(response)
            }
            Err(e) => {
                warn!("{:?} failed: {}", action, e);
                self.notifier
                    .notify(Notification::mutation_failed(&action, &e.user_message()))
                    .await;
                Err(e)
            }
        }
    }
}

/// The slot already logged the failure; this only records who asked
fn log_query_error(key: QueryKey, error: Option<Error>) {
    if let Some(e) = error {
        debug!("Query {} left in error state: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::{NotificationKind, RecordingNotifier};
    use async_trait::async_trait;
    use chill_core::{
        RewardStatistics, Tier, TierName, TransactionStatus, TransactionType,
    };
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn tier(name: TierName, threshold: i64) -> Tier {
        Tier {
            name,
            threshold,
            benefits: vec!["Free late checkout".to_string()],
        }
    }

    fn points_state(points: i64) -> RewardsPointsState {
        RewardsPointsState {
            points,
            tier: tier(TierName::Silver, 0),
            next_tier: Some(tier(TierName::Gold, 5000)),
            progress: points as f64 / 50.0,
            statistics: RewardStatistics::default(),
        }
    }

    fn transaction(id: &str, points: i64, kind: TransactionType) -> RewardTransaction {
        RewardTransaction {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            points,
            description: format!("{} {}", kind.as_str(), id),
            transaction_type: kind,
            booking_id: None,
            recipient_id: None,
            expiry_date: None,
            status: TransactionStatus::Active,
            created_at: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    /// In-process backend with call counters
    struct FakeApi {
        points: Mutex<Result<RewardsPointsState>>,
        transactions: Mutex<Result<Vec<RewardTransaction>>>,
        expiring: Mutex<Result<ExpiringPoints>>,
        mutation: Mutex<Result<MutationResponse>>,
        points_calls: AtomicUsize,
        transactions_calls: AtomicUsize,
        expiring_calls: AtomicUsize,
        mutation_calls: AtomicUsize,
        stall_points: AtomicBool,
    }

    impl FakeApi {
        fn new() -> Self {
            Self {
                points: Mutex::new(Ok(points_state(1000))),
                transactions: Mutex::new(Ok(vec![
                    transaction("1", 100, TransactionType::Earn),
                    transaction("2", 50, TransactionType::Redeem),
                ])),
                expiring: Mutex::new(Ok(ExpiringPoints {
                    expiring_transactions: vec![],
                    total_expiring: 0,
                    nearest_expiry: None,
                })),
                mutation: Mutex::new(Ok(MutationResponse::default())),
                points_calls: AtomicUsize::new(0),
                transactions_calls: AtomicUsize::new(0),
                expiring_calls: AtomicUsize::new(0),
                mutation_calls: AtomicUsize::new(0),
                stall_points: AtomicBool::new(false),
            }
        }

        fn set_points(&self, value: Result<RewardsPointsState>) {
            *self.points.lock().unwrap() = value;
        }

        fn set_mutation(&self, value: Result<MutationResponse>) {
            *self.mutation.lock().unwrap() = value;
        }

        fn total_calls(&self) -> usize {
            self.points_calls.load(Ordering::SeqCst)
                + self.transactions_calls.load(Ordering::SeqCst)
                + self.expiring_calls.load(Ordering::SeqCst)
                + self.mutation_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RewardsApi for FakeApi {
        async fn get_points(&self) -> Result<RewardsPointsState> {
            self.points_calls.fetch_add(1, Ordering::SeqCst);
            if self.stall_points.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            self.points.lock().unwrap().clone()
        }

        async fn get_transactions(&self) -> Result<Vec<RewardTransaction>> {
            self.transactions_calls.fetch_add(1, Ordering::SeqCst);
            self.transactions.lock().unwrap().clone()
        }

        async fn get_expiring(&self) -> Result<ExpiringPoints> {
            self.expiring_calls.fetch_add(1, Ordering::SeqCst);
            self.expiring.lock().unwrap().clone()
        }

        async fn redeem(&self, _request: &RedeemRequest) -> Result<MutationResponse> {
            self.mutation_calls.fetch_add(1, Ordering::SeqCst);
            self.mutation.lock().unwrap().clone()
        }

        async fn transfer(&self, _request: &TransferRequest) -> Result<MutationResponse> {
            self.mutation_calls.fetch_add(1, Ordering::SeqCst);
            self.mutation.lock().unwrap().clone()
        }
    }

    fn user() -> AuthUser {
        AuthUser {
            id: "u-1".to_string(),
            email: "guest@example.com".to_string(),
            display_name: Some("Guest".to_string()),
        }
    }

    async fn signed_in() -> (ChillPointsProvider, Arc<FakeApi>, Arc<RecordingNotifier>) {
        let api = Arc::new(FakeApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let provider = ChillPointsProvider::new(api.clone(), notifier.clone(), Duration::from_secs(60));
        provider.login(user()).await;
        (provider, api, notifier)
    }

    #[tokio::test]
    async fn test_queries_gated_on_authentication() {
        let api = Arc::new(FakeApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let provider = ChillPointsProvider::new(api.clone(), notifier.clone(), Duration::from_secs(60));

        assert!(provider.points().await.unwrap().is_none());
        assert!(provider.transactions().await.unwrap().is_empty());
        assert!(provider.expiring().await.unwrap().is_none());
        assert!(provider.refresh_points().await.unwrap().is_none());

        let snapshot = provider.load().await;
        assert!(!snapshot.authenticated);
        assert!(snapshot.rewards().is_none());
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_load_fetches_each_query_once() {
        let (provider, api, _) = signed_in().await;

        let snapshot = provider.load().await;
        assert_eq!(snapshot.rewards().map(|r| r.points), Some(1000));
        assert_eq!(snapshot.transactions().len(), 2);
        assert!(snapshot.expiring_points().is_some());

        provider.load().await;
        assert_eq!(api.points_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.transactions_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.expiring_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_redeem_success_invalidates_points_and_transactions() {
        let (provider, api, notifier) = signed_in().await;
        provider.load().await;
        api.set_points(Ok(points_state(500)));

        provider.redeem(500, "test").await.unwrap();

        assert_eq!(provider.points.invalidation_count(), 1);
        assert_eq!(provider.transactions.invalidation_count(), 1);
        assert_eq!(provider.expiring.invalidation_count(), 0);
        assert_eq!(api.points_calls.load(Ordering::SeqCst), 2);
        assert_eq!(api.transactions_calls.load(Ordering::SeqCst), 2);
        assert_eq!(api.expiring_calls.load(Ordering::SeqCst), 1);

        let snapshot = provider.snapshot().await;
        assert_eq!(snapshot.rewards().map(|r| r.points), Some(500));
        assert_eq!(notifier.count(NotificationKind::Success), 1);
        assert_eq!(notifier.count(NotificationKind::Failure), 0);
    }

    #[tokio::test]
    async fn test_redeem_failure_leaves_state_unchanged() {
        let (provider, api, notifier) = signed_in().await;
        provider.load().await;
        api.set_mutation(Err(Error::ApiError("Insufficient points".to_string())));

        let result = provider.redeem(5000, "Spa voucher").await;
        assert_eq!(result, Err(Error::ApiError("Insufficient points".to_string())));

        let snapshot = provider.snapshot().await;
        assert_eq!(snapshot.rewards().map(|r| r.points), Some(1000));
        assert_eq!(provider.points.invalidation_count(), 0);
        assert_eq!(api.points_calls.load(Ordering::SeqCst), 1);

        let failures = notifier.notifications();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, NotificationKind::Failure);
        assert_eq!(failures[0].body, "Insufficient points");
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_generic_text() {
        let (provider, api, notifier) = signed_in().await;
        api.set_mutation(Err(Error::NetworkError("connection reset".to_string())));

        assert!(provider.transfer(10, "friend@example.com", "Gift").await.is_err());
        let sent = notifier.notifications();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Transfer failed");
        assert_eq!(sent[0].body, chill_core::errors::GENERIC_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_transfer_success_notifies_once() {
        let (provider, api, notifier) = signed_in().await;
        provider.load().await;

        provider
            .transfer(300, " friend@example.com ", "Birthday")
            .await
            .unwrap();

        assert_eq!(api.mutation_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.points_calls.load(Ordering::SeqCst), 2);
        assert_eq!(api.transactions_calls.load(Ordering::SeqCst), 2);
        let sent = notifier.notifications();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("friend@example.com"));
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_call() {
        let (provider, api, notifier) = signed_in().await;

        assert!(matches!(provider.redeem(0, "test").await, Err(Error::InvalidData(_))));
        assert!(matches!(
            provider.transfer(10, "not-an-email", "gift").await,
            Err(Error::InvalidData(_))
        ));
        assert_eq!(api.mutation_calls.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.count(NotificationKind::Failure), 2);
    }

    #[tokio::test]
    async fn test_mutation_requires_session() {
        let api = Arc::new(FakeApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let provider = ChillPointsProvider::new(api.clone(), notifier.clone(), Duration::from_secs(60));

        assert_eq!(provider.redeem(10, "test").await, Err(Error::NotAuthenticated));
        assert_eq!(api.total_calls(), 0);
        assert_eq!(notifier.count(NotificationKind::Failure), 1);
    }

    #[tokio::test]
    async fn test_queries_fail_independently() {
        let (provider, api, _) = signed_in().await;
        api.set_points(Err(Error::NetworkError("timeout".to_string())));

        let snapshot = provider.load().await;
        assert!(snapshot.points_error());
        assert!(snapshot.rewards().is_none());
        assert_eq!(snapshot.transactions().len(), 2);
        assert!(!snapshot.expiring.is_error());
    }

    #[tokio::test]
    async fn test_invalid_server_state_is_rejected() {
        let (provider, api, _) = signed_in().await;
        api.set_points(Ok(points_state(-20)));

        assert!(matches!(provider.points().await, Err(Error::InvalidData(_))));
        assert!(provider.snapshot().await.points_error());
    }

    #[tokio::test]
    async fn test_manual_refresh_refetches() {
        let (provider, api, _) = signed_in().await;
        provider.load().await;

        api.set_points(Ok(points_state(1500)));
        let refreshed = provider.refresh_points().await.unwrap();
        assert_eq!(refreshed.map(|r| r.points), Some(1500));

        provider.refresh_transactions().await.unwrap();
        assert_eq!(api.points_calls.load(Ordering::SeqCst), 2);
        assert_eq!(api.transactions_calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.points.invalidation_count(), 0);

        provider.refresh_all().await;
        assert_eq!(api.expiring_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_on_focus_refetches_only_stale_slots() {
        let (provider, api, _) = signed_in().await;
        provider.load().await;

        provider.on_focus().await;
        assert_eq!(api.points_calls.load(Ordering::SeqCst), 1);

        provider.points.invalidate();
        provider.on_focus().await;
        assert_eq!(api.points_calls.load(Ordering::SeqCst), 2);
        assert_eq!(api.transactions_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logout_discards_state() {
        let (provider, api, _) = signed_in().await;
        provider.load().await;

        provider.logout().await;
        let snapshot = provider.snapshot().await;
        assert!(!snapshot.authenticated);
        assert!(snapshot.rewards().is_none());
        assert!(snapshot.transactions().is_empty());

        provider.load().await;
        assert_eq!(api.points_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_load_is_retried() {
        let (provider, api, _) = signed_in().await;
        api.stall_points.store(true, Ordering::SeqCst);

        let cancelled = tokio::time::timeout(Duration::from_millis(10), provider.points()).await;
        assert!(cancelled.is_err());
        let snapshot = provider.snapshot().await;
        assert!(!snapshot.points_loading());

        api.stall_points.store(false, Ordering::SeqCst);
        let points = provider.points().await.unwrap();
        assert_eq!(points.map(|p| p.points), Some(1000));
        assert_eq!(api.points_calls.load(Ordering::SeqCst), 2);

        let snapshot = provider.on_focus().await;
        assert_eq!(snapshot.rewards().map(|r| r.points), Some(1000));
        assert_eq!(api.points_calls.load(Ordering::SeqCst), 2);
    }
}
