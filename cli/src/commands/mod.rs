//! Command handlers, one module per screen

pub mod card;
pub mod history;
pub mod mutations;

pub use card::show_card;
pub use history::show_history;
pub use mutations::{redeem, transfer};
