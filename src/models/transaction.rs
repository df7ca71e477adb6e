use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{TransactionId, UserId};

/// A single ledger entry against a user's balance.
///
/// Immutable after creation except for `archived_at`, which moves the
/// transaction into its terminal soft-deleted state: still stored, excluded
/// from reporting aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned unique identifier.
    pub id: TransactionId,
    /// The user whose balance this entry adjusted.
    pub user_id: UserId,
    /// Signed amount; negative is a debit.
    pub amount: Decimal,
    /// Calendar date the transaction is booked under.
    pub date: NaiveDate,
    /// Soft-delete marker. Set at most once; never cleared.
    pub archived_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Whether this transaction still counts towards reports.
    pub fn is_active(&self) -> bool {
        self.archived_at.is_none()
    }
}
