mod errors;
mod report;
mod transaction;
mod user;

pub use errors::LedgerError;
pub use report::DailyReport;
pub use transaction::Transaction;
pub use user::User;
