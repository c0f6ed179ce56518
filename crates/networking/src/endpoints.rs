//! Endpoint paths of the rewards API; also used as cache keys

pub const POINTS: &str = "/api/rewards/points";
pub const TRANSACTIONS: &str = "/api/rewards/transactions";
pub const EXPIRING: &str = "/api/rewards/expiring";
pub const REDEEM: &str = "/api/rewards/redeem";
pub const TRANSFER: &str = "/api/rewards/transfer";
