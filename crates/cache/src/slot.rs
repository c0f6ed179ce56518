//! Single cache slot with query lifecycle and invalidation

use chill_core::Result;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Identifies a cache slot; the endpoint path it mirrors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey(&'static str);

impl QueryKey {
    pub const fn new(path: &'static str) -> Self {
        QueryKey(path)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Query lifecycle: idle -> loading -> success | error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Mutable slot contents, only touched through `QuerySlot`
struct SlotState<T> {
    status: QueryStatus,
    data: Option<Arc<T>>,
    error: Option<String>,
    fetched_at: Option<Instant>,
    stale: bool,
    /// Bumped on reset so in-flight fetches from a previous session are dropped
    generation: u64,
    /// Fetches started but neither finished nor cancelled
    in_flight: u32,
    /// Ticket of the newest fetch whose outcome was stored
    applied: u64,
    fetch_count: u64,
    invalidation_count: u64,
}

impl<T> SlotState<T> {
    fn new() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            fetched_at: None,
            stale: false,
            generation: 0,
            in_flight: 0,
            applied: 0,
            fetch_count: 0,
            invalidation_count: 0,
        }
    }
}

/// Immutable view of a slot at one point in time
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    pub key: QueryKey,
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<String>,
    pub stale: bool,
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            stale: self.stale,
        }
    }
}

impl<T> QuerySnapshot<T> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}

/// Thread-safe cache slot holding one server snapshot
///
/// Readers get `Arc`-shared snapshots; the only write paths are
/// `fetch_with`, `invalidate` and `reset`.
pub struct QuerySlot<T> {
    key: QueryKey,
    stale_after: Duration,
    state: RwLock<SlotState<T>>,
}

impl<T> QuerySlot<T> {
    /// Create an empty slot whose data goes stale after `stale_after`
    pub fn new(key: QueryKey, stale_after: Duration) -> Self {
        Self {
            key,
            stale_after,
            state: RwLock::new(SlotState::new()),
        }
    }

    pub fn key(&self) -> QueryKey {
        self.key
    }

    fn read(&self) -> RwLockReadGuard<'_, SlotState<T>> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SlotState<T>> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current contents of the slot
    pub fn snapshot(&self) -> QuerySnapshot<T> {
        let state = self.read();
        QuerySnapshot {
            key: self.key,
            status: state.status,
            data: state.data.clone(),
            error: state.error.clone(),
            stale: state.stale,
        }
    }

    /// Cached data, if any
    pub fn data(&self) -> Option<Arc<T>> {
        self.read().data.clone()
    }

    /// Whether a fetch is due: no data yet, invalidated, or past the TTL.
    /// A fetch already in flight only suppresses this when data is cached.
    pub fn needs_fetch(&self) -> bool {
        let state = self.read();
        if state.status == QueryStatus::Loading && state.data.is_some() {
            return false;
        }
        match (&state.data, state.fetched_at) {
            (None, _) | (_, None) => true,
            (Some(_), Some(at)) => state.stale || at.elapsed() > self.stale_after,
        }
    }

    /// Number of times a fetcher has been run
    pub fn fetch_count(&self) -> u64 {
        self.read().fetch_count
    }

    /// Number of times the slot has been invalidated
    pub fn invalidation_count(&self) -> u64 {
        self.read().invalidation_count
    }

    /// Run `fetcher` and store its outcome.
    ///
    /// On error the previous data is kept and the error is recorded.
    /// Results that arrive after a `reset`, or after a newer fetch has
    /// already been stored, are discarded. Dropping the returned future
    /// before it completes puts the slot back to its settled status.
    pub async fn fetch_with<F, Fut>(&self, fetcher: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let (generation, ticket) = {
            let mut state = self.write();
            state.status = QueryStatus::Loading;
            state.fetch_count += 1;
            state.in_flight += 1;
            (state.generation, state.fetch_count)
        };
        let mut guard = InFlight {
            slot: self,
            generation,
            armed: true,
        };

        debug!("Fetching {}", self.key);
        let outcome = fetcher().await;
        guard.armed = false;

        let mut state = self.write();
        if state.generation != generation {
            debug!("Discarding result for {} from a previous session", self.key);
            return outcome.map(Arc::new);
        }
        state.in_flight = state.in_flight.saturating_sub(1);

        if ticket < state.applied {
            debug!("Discarding superseded result for {}", self.key);
            return outcome.map(Arc::new);
        }
        state.applied = ticket;

        match outcome {
            Ok(value) => {
                let value = Arc::new(value);
                state.data = Some(value.clone());
                state.error = None;
                state.status = QueryStatus::Success;
                state.fetched_at = Some(Instant::now());
                state.stale = false;
                Ok(value)
            }
            Err(e) => {
                warn!("Query {} failed: {}", self.key, e);
                state.error = Some(e.to_string());
                state.status = QueryStatus::Error;
                Err(e)
            }
        }
    }

    /// Fetch only if `needs_fetch`; otherwise return the cached data
    pub async fn ensure_with<F, Fut>(&self, fetcher: F) -> Result<Option<Arc<T>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.needs_fetch() {
            self.fetch_with(fetcher).await.map(Some)
        } else {
            Ok(self.data())
        }
    }

    /// Mark the data stale; the owner is expected to refetch
    pub fn invalidate(&self) {
        let mut state = self.write();
        state.stale = true;
        state.invalidation_count += 1;
        debug!("Invalidated {}", self.key);
    }

    /// Drop all data and return to idle
    pub fn reset(&self) {
        let mut state = self.write();
        let generation = state.generation + 1;
        *state = SlotState::new();
        state.generation = generation;
    }
}

/// Restores a settled status when a fetch future is dropped mid-flight
struct InFlight<'a, T> {
    slot: &'a QuerySlot<T>,
    generation: u64,
    armed: bool,
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.slot.write();
        if state.generation != self.generation {
            return;
        }
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.in_flight == 0 && state.status == QueryStatus::Loading {
            state.status = if state.error.is_some() {
                QueryStatus::Error
            } else if state.data.is_some() {
                QueryStatus::Success
            } else {
                QueryStatus::Idle
            };
        }
        debug!("Fetch for {} cancelled", self.slot.key);
    }
}
