//! Chill Core - Shared reward models, types, validation and errors

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

pub use errors::{Error, Result};
pub use models::*;
pub use types::*;
