use std::fs::File;
use std::io::BufReader;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, spawn_blocking};
use tracing::{debug, error, info, warn};

use crate::engine::{TransactionProcessor, UserManager};
use crate::models::LedgerError;
use crate::reporting::ReportGenerator;
use crate::storage::LedgerStore;
use crate::types::UserId;

/// One row of the operations CSV driving the batch front-end.
///
/// `target` is overloaded per kind: a name for `user`, a count for `seed`,
/// a user id for `tx`, a transaction id for `archive`, and a user id or the
/// literal `global` for `report`. `amount` and `date` are blank where the
/// kind does not use them.
#[derive(Debug, Clone, Deserialize)]
pub struct OpRecord {
    pub op: OpKind,
    pub target: String,
    #[serde(default, deserialize_with = "decimal_from_str")]
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

/// Parses amounts from the raw field text. Left to serde, csv routes
/// numeric-looking fields through `f64`, which drops the decimal scale
/// (`500.00` would come out as `500`).
fn decimal_from_str<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    let value = value.trim();

    if value.is_empty() {
        return Ok(None);
    }

    Decimal::from_str(value).map(Some).map_err(de::Error::custom)
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    User,
    Seed,
    Tx,
    Archive,
    Report,
}

/// Batch ledger driver: streams an operations CSV through the orchestrators.
///
/// Stands in for the request layer of a served deployment; each row maps to
/// one ledger operation. Malformed rows and failed operations are logged and
/// skipped so one bad row never aborts the batch.
pub struct LedgerEngine<S> {
    processor: TransactionProcessor<S>,
    users: UserManager<S>,
    reports: ReportGenerator<S>,
    backpressure: usize,
}

impl<S: LedgerStore> LedgerEngine<S> {
    pub fn new(
        processor: TransactionProcessor<S>,
        users: UserManager<S>,
        reports: ReportGenerator<S>,
    ) -> Self {
        Self {
            processor,
            users,
            reports,
            backpressure: 256,
        }
    }

    /// Orchestrates the end-to-end pipeline for one operations file.
    pub async fn run(&self, path: &str) -> anyhow::Result<()> {
        let (sender, receiver) = mpsc::channel::<OpRecord>(self.backpressure);
        let csv_handle = Self::spawn_csv_reader(path.to_string(), sender);
        let processing_result = self.process_operations(receiver).await;

        if let Err(error) = csv_handle.await {
            error!("CSV ingestion failed: {error}");
        }

        processing_result
    }

    fn spawn_csv_reader(path: String, sender: mpsc::Sender<OpRecord>) -> JoinHandle<()> {
        spawn_blocking(move || {
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(error) => {
                    error!("Error opening CSV at path: {path} | {error}");
                    return;
                }
            };

            let mut reader = ReaderBuilder::new()
                .trim(Trim::All)
                .flexible(true)
                .from_reader(BufReader::new(file));

            for result in reader.deserialize::<OpRecord>() {
                match result {
                    Ok(record) => {
                        if sender.blocking_send(record).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        error!("CSV deserialization error: {error}");
                    }
                }
            }
        })
    }

    async fn process_operations(
        &self,
        mut receiver: mpsc::Receiver<OpRecord>,
    ) -> anyhow::Result<()> {
        // Operations apply strictly in file order; per-user write safety on
        // top of that comes from the store's row locks.
        while let Some(record) = receiver.recv().await {
            if let Err(error) = self.apply(record).await {
                warn!("Operation skipped: {error}");
            }
        }

        Ok(())
    }

    async fn apply(&self, record: OpRecord) -> Result<(), LedgerError> {
        match record.op {
            OpKind::User => {
                let credit = record.amount.ok_or_else(|| {
                    LedgerError::Validation("user op requires a credit amount".to_string())
                })?;
                self.users.create_user(&record.target, credit)?;
            }
            OpKind::Seed => {
                let count: usize = record.target.parse().map_err(|_| {
                    LedgerError::Validation(format!(
                        "seed op requires a numeric count, got '{}'",
                        record.target
                    ))
                })?;
                let created = self.users.populate_fake_users(count)?;
                info!("Seeded {} synthetic users", created.len());
            }
            OpKind::Tx => {
                let user_id = parse_id(&record.target, "tx op requires a user id")?;
                let amount = record.amount.ok_or_else(|| {
                    LedgerError::Validation("tx op requires an amount".to_string())
                })?;
                let date = record.date.ok_or_else(|| {
                    LedgerError::Validation("tx op requires a date (YYYY-MM-DD)".to_string())
                })?;
                self.processor.create_transaction(user_id, amount, date)?;
            }
            OpKind::Archive => {
                let id = parse_id(&record.target, "archive op requires a transaction id")?;
                self.processor.archive_transaction(id)?;
            }
            OpKind::Report => {
                let report = if record.target.eq_ignore_ascii_case("global") {
                    self.reports.global_daily_report().await?
                } else {
                    let user_id = parse_id(&record.target, "report op requires a user id")?;
                    self.reports.user_daily_report(user_id).await?
                };

                info!(
                    "Daily report ({}): {} transactions totalling {}",
                    report
                        .user_id
                        .map_or_else(|| "global".to_string(), |id| format!("user {id}")),
                    report.number_of_transactions,
                    report.total_amount
                );
            }
        }

        debug!("Applied {:?} op on '{}'", record.op, record.target);

        Ok(())
    }
}

fn parse_id(target: &str, context: &str) -> Result<UserId, LedgerError> {
    target
        .parse()
        .map_err(|_| LedgerError::Validation(format!("{context}, got '{target}'")))
}
