use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use csv::WriterBuilder;
use tokio::task::spawn_blocking;
use tracing::debug;

use crate::models::{DailyReport, LedgerError};
use crate::reporting::ReportCache;
use crate::storage::LedgerStore;
use crate::types::UserId;

/// How long a cached global report stays valid.
pub const GLOBAL_REPORT_TTL: Duration = Duration::from_secs(300);

/// Aggregates active transactions into daily snapshots and CSV exports.
///
/// The per-user path always recomputes; the global path is served from the
/// cache within its window, keyed by the current date.
pub struct ReportGenerator<S> {
    store: Arc<S>,
    cache: Arc<dyn ReportCache>,
    reports_dir: PathBuf,
}

impl<S: LedgerStore> ReportGenerator<S> {
    pub fn new(store: Arc<S>, cache: Arc<dyn ReportCache>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            cache,
            reports_dir: reports_dir.into(),
        }
    }

    /// Builds today's report for one user and exports it as CSV.
    pub async fn user_daily_report(&self, user_id: UserId) -> Result<DailyReport, LedgerError> {
        let transactions = self.store.transactions_by_user(user_id)?;
        let today = Utc::now().date_naive();
        let report = DailyReport::build(transactions, today, Some(user_id));

        let path = self
            .reports_dir
            .join("user_reports")
            .join(format!("user_daily_report_{user_id}_{today}.csv"));
        export_report_csv(path, report.clone()).await?;

        Ok(report)
    }

    /// Builds today's global report, serving it from the cache when a
    /// snapshot for today is still within its expiry window. On a hit no
    /// store access or export happens.
    pub async fn global_daily_report(&self) -> Result<DailyReport, LedgerError> {
        let today = Utc::now().date_naive();
        let key = format!("global_daily_report_{today}");

        if let Some(report) = self.cache.get(&key).await {
            debug!("Global daily report for {today} served from cache");
            return Ok(report);
        }

        let transactions = self.store.all_transactions()?;
        let report = DailyReport::build(transactions, today, None);

        let path = self
            .reports_dir
            .join("global_reports")
            .join(format!("global_daily_report_{today}.csv"));
        export_report_csv(path, report.clone()).await?;

        self.cache.insert(key, report.clone()).await;

        Ok(report)
    }
}

/// Writes the export off the async workers.
async fn export_report_csv(path: PathBuf, report: DailyReport) -> Result<(), LedgerError> {
    spawn_blocking(move || write_report_csv(&path, &report))
        .await
        .map_err(|error| LedgerError::Store(format!("report export task failed: {error}")))?
}

/// CSV shape: `Date,Amount` header, one row per active transaction, then a
/// three-field summary row under the two-field header (hence `flexible`).
fn write_report_csv(path: &Path, report: &DailyReport) -> Result<(), LedgerError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;

    writer.write_record(["Date", "Amount"])?;

    for transaction in &report.transactions {
        writer.write_record([transaction.date.to_string(), transaction.amount.to_string()])?;
    }

    writer.write_record([
        "Total".to_string(),
        report.total_amount.to_string(),
        format!("Transactions: {}", report.number_of_transactions),
    ])?;

    writer.flush()?;

    Ok(())
}
