use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{TransactionId, UserId};

/// Failure taxonomy for ledger operations.
///
/// Every failure is immediate and terminal for the operation; there are no
/// retries. Validation, not-found and insufficient-balance errors are
/// deterministic and carry enough context for a caller-facing message.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("User [{0}] was not found")]
    UserNotFound(UserId),
    #[error("Transaction [{0}] was not found")]
    TransactionNotFound(TransactionId),
    #[error("Insufficient balance for user [{user_id}]: credit {credit} cannot cover {amount}")]
    InsufficientBalance {
        user_id: UserId,
        credit: Decimal,
        amount: Decimal,
    },
    #[error("Store failure: {0}")]
    Store(String),
    #[error("Report export failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Report export failed: {0}")]
    Csv(#[from] csv::Error),
}
