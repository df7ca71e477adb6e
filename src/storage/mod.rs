mod memory;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::models::{LedgerError, Transaction, User};
use crate::types::{TransactionId, UserId};

pub use memory::MemoryStore;

/// Persistence seam for the ledger: two tables (`users`, `transactions`)
/// plus the one atomic primitive the transaction pipeline needs.
///
/// Store handles are constructed explicitly and injected (`Arc<S>`); there is
/// no process-wide connection singleton.
pub trait LedgerStore: Send + Sync + 'static {
    /// Inserts a new user row and returns it with its assigned id.
    fn insert_user(&self, name: String, credit: Decimal) -> Result<User, LedgerError>;

    fn user_by_id(&self, id: UserId) -> Result<Option<User>, LedgerError>;

    /// All user rows, id-ordered.
    fn all_users(&self) -> Result<Vec<User>, LedgerError>;

    /// The atomic check-then-write unit of the transaction pipeline.
    ///
    /// Acquires the user's row lock, runs `check` against the current row,
    /// and if it returns a new credit value, persists the transaction row and
    /// the credit update before releasing the lock. A `check` error aborts
    /// with nothing written. The lock spans the entire sequence, so two
    /// concurrent debits on one user cannot both pass the same check.
    ///
    /// # Errors
    /// `UserNotFound` if the user row does not exist; otherwise whatever
    /// `check` returns, or a `Store` failure.
    fn record_transaction<F>(
        &self,
        user_id: UserId,
        amount: Decimal,
        date: NaiveDate,
        check: F,
    ) -> Result<Transaction, LedgerError>
    where
        F: FnOnce(&User) -> Result<Decimal, LedgerError>;

    fn transaction_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError>;

    /// Sets `archived_at` on the row if it is not already set and returns the
    /// row. Re-archival keeps the original timestamp.
    fn archive_transaction(
        &self,
        id: TransactionId,
        at: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError>;

    /// All transactions for the user, id-ordered, archived rows included.
    /// No existence check on the user; empty if none.
    fn transactions_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, LedgerError>;

    /// Every transaction row, id-ordered, archived rows included.
    fn all_transactions(&self) -> Result<Vec<Transaction>, LedgerError>;
}
