mod batch;
mod processor;
#[cfg(test)]
mod tests;
mod users;

pub use batch::{LedgerEngine, OpKind, OpRecord};
pub use processor::TransactionProcessor;
pub use users::UserManager;
