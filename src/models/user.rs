use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A ledger account holder.
///
/// `credit` is the user's current balance. It is owned exclusively by the
/// transaction pipeline: the only mutation path is a balance-checked
/// transaction, applied under the store's row lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned unique identifier.
    pub id: UserId,
    /// Display name. Non-empty, but not unique.
    pub name: String,
    /// Current balance. May go negative only if seeded that way at creation;
    /// transactions never drive it below zero.
    pub credit: Decimal,
}
