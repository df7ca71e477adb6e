pub mod engine;
pub mod models;
pub mod reporting;
pub mod storage;
pub mod types;
