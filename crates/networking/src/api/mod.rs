//! Rewards API abstraction
//!
//! The store talks to the backend only through [`RewardsApi`], so it can
//! run against [`ChillClient`](crate::ChillClient) or an in-process fake.

mod rewards;

pub use rewards::*;
