use super::{LedgerEngine, OpRecord, TransactionProcessor, UserManager};

use std::io::Write;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::{NamedTempFile, TempDir};

use crate::models::LedgerError;
use crate::reporting::{NoopReportCache, ReportGenerator};
use crate::storage::{LedgerStore, MemoryStore};

fn booking_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 30).expect("valid date")
}

fn build_engine(store: Arc<MemoryStore>, reports_dir: &TempDir) -> LedgerEngine<MemoryStore> {
    LedgerEngine::new(
        TransactionProcessor::new(store.clone()),
        UserManager::new(store.clone()),
        ReportGenerator::new(store, Arc::new(NoopReportCache), reports_dir.path()),
    )
}

fn create_operations_csv(rows: &[&str]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;

    writeln!(file, "op,target,amount,date")?;
    for row in rows {
        writeln!(file, "{row}")?;
    }

    Ok(file)
}

#[test]
fn test_create_transaction_updates_balance_and_assigns_id() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let user = store.insert_user("Ada Lovelace".to_string(), Decimal::from(500))?;
    let processor = TransactionProcessor::new(store.clone());

    let transaction = processor.create_transaction(user.id, Decimal::from(100), booking_date())?;

    assert_eq!(transaction.id, 1);
    assert_eq!(transaction.amount, Decimal::from(100));

    let users = UserManager::new(store);
    assert_eq!(users.user_balance(user.id)?, Decimal::from(600));

    Ok(())
}

#[test]
fn test_overdraft_fails_and_persists_nothing() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let user = store.insert_user("Ada Lovelace".to_string(), Decimal::from(500))?;
    let processor = TransactionProcessor::new(store.clone());

    let result = processor.create_transaction(user.id, Decimal::from(-600), booking_date());

    assert!(matches!(
        result,
        Err(LedgerError::InsufficientBalance { .. })
    ));
    assert_eq!(
        UserManager::new(store.clone()).user_balance(user.id)?,
        Decimal::from(500)
    );
    assert!(processor.all_transactions()?.is_empty());

    Ok(())
}

#[test]
fn test_debit_to_exactly_zero_succeeds() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let user = store.insert_user("Ada Lovelace".to_string(), Decimal::from(500))?;
    let processor = TransactionProcessor::new(store.clone());

    processor.create_transaction(user.id, Decimal::from(-500), booking_date())?;

    assert_eq!(
        UserManager::new(store).user_balance(user.id)?,
        Decimal::ZERO
    );

    Ok(())
}

#[test]
fn test_transaction_for_unknown_user_fails() {
    let store = Arc::new(MemoryStore::new());
    let processor = TransactionProcessor::new(store);

    let result = processor.create_transaction(42, Decimal::from(10), booking_date());

    assert!(matches!(result, Err(LedgerError::UserNotFound(42))));
}

#[test]
fn test_archived_transaction_stays_in_full_listing() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let user = store.insert_user("Ada Lovelace".to_string(), Decimal::from(500))?;
    let processor = TransactionProcessor::new(store);

    let transaction = processor.create_transaction(user.id, Decimal::from(100), booking_date())?;
    processor.archive_transaction(transaction.id)?;

    let all = processor.all_transactions()?;
    assert_eq!(all.len(), 1);
    assert!(!all[0].is_active());

    let mine = processor.transactions_by_user(user.id)?;
    assert_eq!(mine.len(), 1);

    Ok(())
}

#[test]
fn test_archive_unknown_transaction_surfaces_not_found() {
    let store = Arc::new(MemoryStore::new());
    let processor = TransactionProcessor::new(store);

    let result = processor.archive_transaction(7);

    assert!(matches!(result, Err(LedgerError::TransactionNotFound(7))));
}

#[test]
fn test_create_user_rejects_blank_name() {
    let store = Arc::new(MemoryStore::new());
    let users = UserManager::new(store);

    let result = users.create_user("   ", Decimal::from(10));

    assert!(matches!(result, Err(LedgerError::Validation(_))));
}

#[test]
fn test_create_user_allows_negative_seed_credit() -> Result<()> {
    // Non-negativity is only enforced at transaction time.
    let store = Arc::new(MemoryStore::new());
    let users = UserManager::new(store);

    let user = users.create_user("Ada Lovelace", Decimal::from(-50))?;

    assert_eq!(users.user_balance(user.id)?, Decimal::from(-50));

    Ok(())
}

#[test]
fn test_balance_of_unknown_user_fails() {
    let store = Arc::new(MemoryStore::new());
    let users = UserManager::new(store);

    assert!(users.user_by_id(9).expect("lookup works").is_none());
    assert!(matches!(
        users.user_balance(9),
        Err(LedgerError::UserNotFound(9))
    ));
}

#[test]
fn test_populate_fake_users_stays_in_credit_range() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let users = UserManager::new(store.clone());

    let created = users.populate_fake_users(25)?;

    assert_eq!(created.len(), 25);
    assert_eq!(store.all_users()?.len(), 25);

    for user in created {
        assert!(!user.name.trim().is_empty());
        assert!(user.credit >= Decimal::ZERO);
        assert!(user.credit <= Decimal::from(1000));
        assert!(user.credit.scale() <= 2);
    }

    Ok(())
}

#[test]
fn test_operation_amounts_keep_decimal_scale() -> Result<()> {
    let csv_content =
        "op,target,amount,date\nuser,Ada Lovelace,500.00,\ntx,1,0.0001,2026-08-30\narchive,2,,\n";

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(csv_content.as_bytes());
    let records: Vec<OpRecord> = reader.deserialize().collect::<Result<_, _>>()?;

    assert_eq!(
        records[0].amount.map(|amount| amount.to_string()),
        Some("500.00".to_string())
    );
    assert_eq!(
        records[1].amount.map(|amount| amount.to_string()),
        Some("0.0001".to_string())
    );
    assert!(records[2].amount.is_none());

    Ok(())
}

#[tokio::test]
async fn test_engine_processes_operations_in_order() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let reports_dir = TempDir::new()?;
    let engine = build_engine(store.clone(), &reports_dir);

    let file = create_operations_csv(&[
        "user,Ada Lovelace,500.00,",
        "user,Grace Hopper,250.00,",
        "tx,1,100.00,2026-08-30",
        "tx,2,-50.00,2026-08-30",
        "archive,2,,",
        "report,1,,",
        "report,global,,",
    ])?;

    engine
        .run(file.path().to_str().ok_or_else(|| anyhow!("bad path"))?)
        .await?;

    let users = store.all_users()?;
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].credit.to_string(), "600.00");
    assert_eq!(users[1].credit.to_string(), "200.00");

    let all = store.all_transactions()?;
    assert_eq!(all.len(), 2);
    assert!(all[0].is_active());
    assert!(!all[1].is_active());

    assert!(reports_dir.path().join("user_reports").exists());
    assert!(reports_dir.path().join("global_reports").exists());

    Ok(())
}

#[tokio::test]
async fn test_engine_skips_failed_and_malformed_rows() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let reports_dir = TempDir::new()?;
    let engine = build_engine(store.clone(), &reports_dir);

    let file = create_operations_csv(&[
        "user,Ada Lovelace,500.00,",
        "tx,1,-600.00,2026-08-30",
        "nonsense,row,here,",
        "tx,not-a-number,10.00,2026-08-30",
        "tx,1,,2026-08-30",
        "archive,99,,",
        "tx,1,100.00,2026-08-30",
    ])?;

    engine
        .run(file.path().to_str().ok_or_else(|| anyhow!("bad path"))?)
        .await?;

    // The overdraft, malformed and not-found rows were skipped; the final
    // valid transaction still landed.
    let users = store.all_users()?;
    assert_eq!(users[0].credit.to_string(), "600.00");
    assert_eq!(store.all_transactions()?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_engine_handles_missing_csv_file_without_error() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let reports_dir = TempDir::new()?;
    let engine = build_engine(store.clone(), &reports_dir);

    assert!(engine.run("missing.csv").await.is_ok());
    assert!(store.all_users()?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_engine_seed_op_populates_users() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let reports_dir = TempDir::new()?;
    let engine = build_engine(store.clone(), &reports_dir);

    let file = create_operations_csv(&["seed,5,,"])?;

    engine
        .run(file.path().to_str().ok_or_else(|| anyhow!("bad path"))?)
        .await?;

    assert_eq!(store.all_users()?.len(), 5);

    Ok(())
}
