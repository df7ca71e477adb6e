use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::models::{LedgerError, Transaction, User};
use crate::storage::LedgerStore;
use crate::types::{TransactionId, UserId};

struct UserRow {
    name: String,
    credit: Decimal,
}

/// In-memory `LedgerStore` implementation.
///
/// User rows live in a `DashMap`; holding a `get_mut` guard on an entry is
/// the row-level lock the transaction pipeline relies on. Transactions live
/// in a mutex-guarded `BTreeMap` so fetch-all comes back id-ordered. Lock
/// order is fixed: user entry first, then the transaction table.
pub struct MemoryStore {
    users: DashMap<UserId, UserRow>,
    transactions: Mutex<BTreeMap<TransactionId, Transaction>>,
    next_user_id: AtomicI64,
    next_transaction_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            transactions: Mutex::new(BTreeMap::new()),
            next_user_id: AtomicI64::new(0),
            next_transaction_id: AtomicI64::new(0),
        }
    }

    fn lock_transactions(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<TransactionId, Transaction>>, LedgerError> {
        self.transactions
            .lock()
            .map_err(|_| LedgerError::Store("transaction table lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for MemoryStore {
    fn insert_user(&self, name: String, credit: Decimal) -> Result<User, LedgerError> {
        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1;

        self.users.insert(
            id,
            UserRow {
                name: name.clone(),
                credit,
            },
        );

        Ok(User { id, name, credit })
    }

    fn user_by_id(&self, id: UserId) -> Result<Option<User>, LedgerError> {
        Ok(self.users.get(&id).map(|row| User {
            id,
            name: row.name.clone(),
            credit: row.credit,
        }))
    }

    fn all_users(&self) -> Result<Vec<User>, LedgerError> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .map(|entry| User {
                id: *entry.key(),
                name: entry.value().name.clone(),
                credit: entry.value().credit,
            })
            .collect();

        users.sort_by_key(|user| user.id);

        Ok(users)
    }

    fn record_transaction<F>(
        &self,
        user_id: UserId,
        amount: Decimal,
        date: NaiveDate,
        check: F,
    ) -> Result<Transaction, LedgerError>
    where
        F: FnOnce(&User) -> Result<Decimal, LedgerError>,
    {
        // The row lock: the guard stays held across check and both writes.
        let mut row = self
            .users
            .get_mut(&user_id)
            .ok_or(LedgerError::UserNotFound(user_id))?;

        let user = User {
            id: user_id,
            name: row.name.clone(),
            credit: row.credit,
        };

        let new_credit = check(&user)?;

        let id = self.next_transaction_id.fetch_add(1, Ordering::SeqCst) + 1;
        let transaction = Transaction {
            id,
            user_id,
            amount,
            date,
            archived_at: None,
        };

        let mut table = self.lock_transactions()?;
        table.insert(id, transaction.clone());
        row.credit = new_credit;

        Ok(transaction)
    }

    fn transaction_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        Ok(self.lock_transactions()?.get(&id).cloned())
    }

    fn archive_transaction(
        &self,
        id: TransactionId,
        at: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        let mut table = self.lock_transactions()?;

        let transaction = table
            .get_mut(&id)
            .ok_or(LedgerError::TransactionNotFound(id))?;

        if transaction.archived_at.is_none() {
            transaction.archived_at = Some(at);
        }

        Ok(transaction.clone())
    }

    fn transactions_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self
            .lock_transactions()?
            .values()
            .filter(|transaction| transaction.user_id == user_id)
            .cloned()
            .collect())
    }

    fn all_transactions(&self) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.lock_transactions()?.values().cloned().collect())
    }
}
