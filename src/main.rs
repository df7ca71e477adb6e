use std::io::{BufWriter, Write, stdout};
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use credit_ledger::engine::{LedgerEngine, TransactionProcessor, UserManager};
use credit_ledger::reporting::{GLOBAL_REPORT_TTL, MokaReportCache, ReportGenerator};
use credit_ledger::storage::{LedgerStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: credit-ledger [operations].csv [log_level:optional] [reports_dir:optional]");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        exit(1);
    }

    let path = &args[1];
    let log_level = args
        .get(2)
        .map(|s| parse_log_level(s))
        .unwrap_or(LevelFilter::ERROR);
    let reports_dir = args.get(3).map_or("reports", String::as_str);

    setup_logging(log_level);

    let store = Arc::new(MemoryStore::new());
    let reports = ReportGenerator::new(
        store.clone(),
        Arc::new(MokaReportCache::new(GLOBAL_REPORT_TTL)),
        reports_dir,
    );
    let engine = LedgerEngine::new(
        TransactionProcessor::new(store.clone()),
        UserManager::new(store.clone()),
        reports,
    );

    let timer = Instant::now();
    engine.run(path).await?;
    let duration = timer.elapsed();

    info!("Processed operations in: {duration:?}");

    write_results_to_stdout(store)?;

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    // Results go to stdout, so logging stays on stderr.
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}

fn write_results_to_stdout(store: Arc<MemoryStore>) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());

    writeln!(output, "id,name,credit")?;

    for user in store.all_users()? {
        writeln!(output, "{},{},{}", user.id, user.name, user.credit)?;
    }

    output.flush()?;

    Ok(())
}
