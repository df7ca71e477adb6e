use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Transaction;
use crate::types::UserId;

/// An ephemeral daily aggregate snapshot.
///
/// Not persisted beyond the cache and the CSV export. Archived transactions
/// are filtered out before any aggregate is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    /// Sum of `amount` over the active transactions below.
    pub total_amount: Decimal,
    /// Count of the active transactions below.
    pub number_of_transactions: usize,
    /// The active transactions the aggregates were computed from, id-ordered.
    pub transactions: Vec<Transaction>,
    /// The date the report was generated on.
    pub date: NaiveDate,
    /// Scope: `Some` for a per-user report, `None` for the global one.
    pub user_id: Option<UserId>,
}

impl DailyReport {
    /// Builds a snapshot from raw transactions, dropping archived entries.
    pub fn build(transactions: Vec<Transaction>, date: NaiveDate, user_id: Option<UserId>) -> Self {
        let transactions: Vec<Transaction> = transactions
            .into_iter()
            .filter(Transaction::is_active)
            .collect();

        let total_amount = transactions
            .iter()
            .fold(Decimal::ZERO, |sum, transaction| sum + transaction.amount);

        Self {
            total_amount,
            number_of_transactions: transactions.len(),
            transactions,
            date,
            user_id,
        }
    }
}
