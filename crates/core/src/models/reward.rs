//! Reward transaction models for the /api/rewards endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of points movement recorded on a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Earn,
    Redeem,
    Transfer,
    Expire,
}

impl TransactionType {
    /// Whether the transaction is displayed as points coming in.
    ///
    /// Transfers are shown as credits, matching the history table convention.
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionType::Earn | TransactionType::Transfer)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Earn => "earn",
            TransactionType::Redeem => "redeem",
            TransactionType::Transfer => "transfer",
            TransactionType::Expire => "expire",
        }
    }
}

/// Lifecycle status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Active,
    Used,
    Expired,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Active => "active",
            TransactionStatus::Used => "used",
            TransactionStatus::Expired => "expired",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

/// One entry from `GET /api/rewards/transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTransaction {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub user_id: String,
    /// Magnitude only; direction comes from `transaction_type`
    pub points: i64,
    #[serde(default)]
    pub description: String,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Response from `GET /api/rewards/expiring`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringPoints {
    #[serde(default)]
    pub expiring_transactions: Vec<RewardTransaction>,
    #[serde(default)]
    pub total_expiring: i64,
    #[serde(default)]
    pub nearest_expiry: Option<DateTime<Utc>>,
}

impl ExpiringPoints {
    /// True when the card should show an expiry warning
    pub fn has_warning(&self) -> bool {
        self.total_expiring > 0
    }
}

/// Deserialize an id that may arrive as a string or a number
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct StringOrNumber;

    impl<'de> de::Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}
