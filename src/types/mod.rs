/// Store-assigned user identifier (auto-increment semantics, starts at 1).
pub type UserId = i64;
/// Store-assigned transaction identifier (auto-increment semantics, starts at 1).
pub type TransactionId = i64;
