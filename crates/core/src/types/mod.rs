//! Shared type definitions and newtypes

use serde::{Deserialize, Serialize};

use crate::TransactionType;

/// Signed point amount (for clarity in function signatures)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Points(pub i64);

impl Points {
    pub fn new(amount: i64) -> Self {
        Points(amount)
    }

    /// Apply the direction implied by a transaction type to a magnitude
    pub fn for_transaction(magnitude: i64, kind: TransactionType) -> Self {
        if kind.is_credit() {
            Points(magnitude.abs())
        } else {
            Points(-magnitude.abs())
        }
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Always carries a sign, e.g. `+100` or `-50`
    pub fn signed_display(&self) -> String {
        if self.0 < 0 {
            format!("-{}", group_thousands(self.0.unsigned_abs()))
        } else {
            format!("+{}", group_thousands(self.0 as u64))
        }
    }
}

impl std::fmt::Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 < 0 {
            write!(f, "-{}", group_thousands(self.0.unsigned_abs()))
        } else {
            write!(f, "{}", group_thousands(self.0 as u64))
        }
    }
}

/// Format with comma thousands separators (12500 -> "12,500")
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
