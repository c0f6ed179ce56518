//! Chill Networking - HTTP client and the rewards API seam

pub mod api;
pub mod endpoints;
pub mod http;

pub use api::RewardsApi;
pub use http::{ChillClient, ClientOptions};
