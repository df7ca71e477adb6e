use std::sync::Arc;

use rand::Rng;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{LedgerError, User};
use crate::storage::LedgerStore;
use crate::types::UserId;

const FIRST_NAMES: [&str; 12] = [
    "Ada", "Alan", "Barbara", "Donald", "Edsger", "Grace", "John", "Katherine", "Leslie",
    "Margaret", "Niklaus", "Tony",
];

const LAST_NAMES: [&str; 12] = [
    "Lovelace", "Turing", "Liskov", "Knuth", "Dijkstra", "Hopper", "Backus", "Johnson", "Lamport",
    "Hamilton", "Wirth", "Hoare",
];

/// Orchestrates user creation and synthetic population.
pub struct UserManager<S> {
    store: Arc<S>,
}

impl<S: LedgerStore> UserManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a user with the given starting credit.
    ///
    /// The name must be non-empty but is not unique; credit is stored as
    /// given (non-negativity is only enforced at transaction time).
    pub fn create_user(&self, name: &str, credit: Decimal) -> Result<User, LedgerError> {
        let name = name.trim();

        if name.is_empty() {
            return Err(LedgerError::Validation(
                "User name must not be empty".to_string(),
            ));
        }

        let user = self.store.insert_user(name.to_string(), credit)?;

        debug!("User [{}] '{}' created with credit {}", user.id, user.name, user.credit);

        Ok(user)
    }

    /// Persists `count` synthetic users with randomized names and a credit
    /// drawn from 0..=1000 at two decimal places.
    ///
    /// Each user is persisted individually; a failure partway leaves the
    /// earlier users in place.
    pub fn populate_fake_users(&self, count: usize) -> Result<Vec<User>, LedgerError> {
        let mut rng = rand::rng();
        let mut created = Vec::with_capacity(count);

        for _ in 0..count {
            let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
            let cents: i64 = rng.random_range(0..=100_000);

            created.push(
                self.store
                    .insert_user(format!("{first} {last}"), Decimal::new(cents, 2))?,
            );
        }

        Ok(created)
    }

    /// Absent rather than failing when the id is unknown.
    pub fn user_by_id(&self, id: UserId) -> Result<Option<User>, LedgerError> {
        self.store.user_by_id(id)
    }

    /// # Errors
    /// `UserNotFound` if the id is unknown.
    pub fn user_balance(&self, id: UserId) -> Result<Decimal, LedgerError> {
        self.user_by_id(id)?
            .map(|user| user.credit)
            .ok_or(LedgerError::UserNotFound(id))
    }
}
