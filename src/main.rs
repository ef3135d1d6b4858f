// src/main.rs
use aqua_miner_rs::{self, *};
use clap::Parser;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Runtime;

/// How often counters are written to the log while mining
const REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Main entry point for the miner
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(MinerError)` if any operation fails
///
/// # Flow
/// 1. Parses command line arguments
/// 2. Delegates to appropriate subcommand handler
/// 3. Propagates any errors upward
fn main() -> Result<(), MinerError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Start(opts) => start_mining(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Starts the mining operation with given configuration options
///
/// # Operations
/// 1. Initializes logging and loads/validates configuration
/// 2. Launches the poll thread and the stats reporter
/// 3. Spawns the mining worker fleet
/// 4. Blocks until Ctrl+C or a fatal error, then shuts everything down
fn start_mining(opts: cli::StartOptions) -> Result<(), MinerError> {
    utils::init_logging();

    let mut config = config::load(&opts.config)?;
    // Apply CLI overrides
    if let Some(workers) = opts.workers {
        config.worker_threads = workers;
    }

    let rt = Runtime::new()?;
    let run = Arc::new(AtomicBool::new(true));
    let metrics = Arc::new(Metrics::new());
    let store = Arc::new(WorkStore::new());

    // poll loop and submitter share one request id sequence
    let req_id = Arc::new(AtomicU64::new(0));
    let client = Arc::new(CoordinatorClient::new(
        config.endpoint().url.clone(),
        req_id,
    ));
    let solo = config.solo();
    let threads = config.effective_threads();

    log::info!("--- Start {} mining ---", if solo { "solo" } else { "pool" });
    log::info!(
        "{:<8} : {}",
        if solo { "node" } else { "pool" },
        config.endpoint().url
    );
    log::info!("nthreads : {}", threads);
    log::info!("refresh  : {:.1}s", config.poll_interval_secs as f64);

    let poll_handle = PollLoop::new(
        client.clone(),
        store.clone(),
        run.clone(),
        rt.handle().clone(),
        Duration::from_secs(config.poll_interval_secs),
    )
    .start();

    let reporter_handle =
        StatsReporter::new(metrics.clone(), run.clone(), REPORT_INTERVAL, threads).start();

    let sink = Arc::new(RpcSubmitter::new(
        client,
        rt.handle().clone(),
        metrics.clone(),
        solo,
    ));
    let mut scheduler = Scheduler::new(
        store,
        metrics.clone(),
        run.clone(),
        config.reject_policy,
    );
    scheduler.start(threads, sink);

    // Block until Ctrl+C, or until a fatal error clears the run flag
    rt.block_on(async {
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Ctrl+C received, will shutdown soon");
                    break;
                }
                _ = tokio::time::sleep(Duration::from_millis(500)) => {
                    if !run.load(Ordering::Relaxed) {
                        break;
                    }
                }
            }
        }
    });

    log::info!("Stopping threads");
    scheduler.stop();
    let _ = poll_handle.join();
    let _ = reporter_handle.join();

    let snap = metrics.snapshot();
    log::info!(
        "Session total: {} hashes | {}/{} shares accepted | {} blocks",
        snap.hashes_total,
        snap.shares_accepted,
        snap.shares_submitted,
        snap.blocks_accepted
    );
    Ok(())
}

/// Generates a configuration template file
///
/// # Operations
/// 1. Generates template content based on options
/// 2. Writes the template to the specified output file
fn generate_config(opts: cli::ConfigOptions) -> Result<(), MinerError> {
    // default to a pool template when neither section was requested
    let (pool, solo) = if !opts.pool && !opts.solo {
        (true, false)
    } else {
        (opts.pool, opts.solo)
    };
    let config = config::generate_template(pool, solo);
    std::fs::write(opts.output, config)?;
    Ok(())
}
