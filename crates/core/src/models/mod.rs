//! Data models mirrored from the rewards API

mod mutation;
mod reward;
mod tier;

pub use mutation::*;
pub use reward::*;
pub use tier::*;
