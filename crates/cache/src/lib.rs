//! Chill Cache - Keyed query slots mirroring server state
//!
//! Each slot caches one endpoint's response with a TTL, tracks the query
//! lifecycle and supports invalidation after mutations.

pub mod slot;

pub use slot::{QueryKey, QuerySlot, QuerySnapshot, QueryStatus};
