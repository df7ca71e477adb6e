use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{LedgerError, Transaction};
use crate::storage::LedgerStore;
use crate::types::{TransactionId, UserId};

/// Orchestrates balance-checked transaction creation and archival.
///
/// This is the only component that mutates user credit. The balance check
/// and the insert/update pair run inside the store's atomic unit, under the
/// user's row lock, so a transaction row can never exist without its credit
/// update and concurrent debits cannot both pass the same check.
pub struct TransactionProcessor<S> {
    store: Arc<S>,
}

impl<S: LedgerStore> TransactionProcessor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Records a transaction against the user's balance.
    ///
    /// # Errors
    /// - `UserNotFound` if `user_id` references no user.
    /// - `InsufficientBalance` if the amount would drive credit negative;
    ///   nothing is persisted in that case.
    /// - `Store` if persistence fails.
    pub fn create_transaction(
        &self,
        user_id: UserId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Transaction, LedgerError> {
        let transaction = self.store.record_transaction(user_id, amount, date, |user| {
            let new_credit = user.credit + amount;

            if new_credit < Decimal::ZERO {
                return Err(LedgerError::InsufficientBalance {
                    user_id,
                    credit: user.credit,
                    amount,
                });
            }

            Ok(new_credit)
        })?;

        debug!(
            "Transaction [{}] of {} recorded for user [{}]",
            transaction.id, transaction.amount, user_id
        );

        Ok(transaction)
    }

    /// Archives (soft-deletes) a transaction.
    ///
    /// Store failures propagate like every other path; archiving an already
    /// archived transaction is a no-op that keeps the original timestamp.
    ///
    /// # Errors
    /// `TransactionNotFound` if `id` references no transaction.
    pub fn archive_transaction(&self, id: TransactionId) -> Result<(), LedgerError> {
        let transaction = self.store.archive_transaction(id, Utc::now())?;

        debug!("Transaction [{}] archived", transaction.id);

        Ok(())
    }

    /// All of one user's transactions, archived included. No existence check
    /// on the user; empty if none.
    pub fn transactions_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, LedgerError> {
        self.store.transactions_by_user(user_id)
    }

    /// Every transaction, archived included. Filtering archived rows is the
    /// report generator's job.
    pub fn all_transactions(&self) -> Result<Vec<Transaction>, LedgerError> {
        self.store.all_transactions()
    }
}
