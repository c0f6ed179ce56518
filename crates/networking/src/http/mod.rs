//! Raw HTTP access to the rewards endpoints

mod client;

pub use client::{ChillClient, ClientOptions, DEFAULT_BASE_URL, DEFAULT_SESSION_COOKIE};
