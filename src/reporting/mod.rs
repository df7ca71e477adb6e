mod cache;
mod generator;

pub use cache::{MokaReportCache, NoopReportCache, ReportCache};
pub use generator::{GLOBAL_REPORT_TTL, ReportGenerator};
