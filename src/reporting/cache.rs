use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::models::DailyReport;

/// Best-effort accelerator for the global daily report.
///
/// Never a correctness dependency: a cache that always misses degrades the
/// generator to always-recompute, never to wrong data. Entries expire on the
/// TTL the implementation was built with.
#[async_trait]
pub trait ReportCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<DailyReport>;
    async fn insert(&self, key: String, report: DailyReport);
}

/// Moka-backed cache with a fixed time-to-live.
pub struct MokaReportCache {
    cache: Cache<String, DailyReport>,
}

impl MokaReportCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().time_to_live(ttl).build(),
        }
    }
}

#[async_trait]
impl ReportCache for MokaReportCache {
    async fn get(&self, key: &str) -> Option<DailyReport> {
        self.cache.get(key).await
    }

    async fn insert(&self, key: String, report: DailyReport) {
        self.cache.insert(key, report).await;
    }
}

/// Cache that never hits; every report is recomputed.
pub struct NoopReportCache;

#[async_trait]
impl ReportCache for NoopReportCache {
    async fn get(&self, _key: &str) -> Option<DailyReport> {
        None
    }

    async fn insert(&self, _key: String, _report: DailyReport) {}
}
