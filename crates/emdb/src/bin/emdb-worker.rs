use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::{Parser, Subcommand};
use tokio::sync::broadcast;

use emdb::config::{load_config, WorkerConfig};
use emdb::db::Database;
use emdb::error::WorkerError;
use emdb::job::{JobQueue, Sweeper};
use emdb::worker::{Worker, WorkerContext};
use emdb::{logging, Result};

#[derive(Parser, Debug)]
#[command(name = "emdb-worker", version, about = "Job queue worker for the emdb movie catalogue")]
struct Cli {
    /// Path to a JSON config file. Built-in defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Debug)]
enum Command {
    /// Poll for jobs until interrupted (default).
    Run,
    /// Claim and process a single job, if any.
    WorkOnce,
    /// Add a job.
    Enqueue {
        /// Movie id, review id, or "all" for fan-out actions.
        subject: String,
        /// refresh-reviews, refresh-all-reviews, find-titles or find-all-titles.
        action: String,
    },
    /// List all jobs, newest first.
    List,
    /// Show job counts per status.
    Stats,
    /// Delete one job.
    Delete { id: i64 },
    /// Delete every job.
    DeleteAll,
    /// Return every job to todo.
    ResetAll,
    /// Return abandoned jobs to todo now.
    Sweep,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "emdb-worker failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => WorkerConfig::default(),
    };

    let path = config
        .resolved_database_path()
        .ok_or(WorkerError::NoDatabasePath)?;
    let db = Database::open_with_busy_timeout(&path, config.busy_timeout())?;
    let queue = JobQueue::new(db.clone());

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_worker(&config, db),
        Command::WorkOnce => {
            let ctx = WorkerContext::from_config(&config, db)?;
            let worker = Worker::new(ctx, config.categories.clone());
            let handled = runtime()?.block_on(worker.run_once())?;
            println!("{}", if handled { "processed one job" } else { "no work available" });
            Ok(())
        }
        Command::Enqueue { subject, action } => {
            let id = queue.enqueue(&subject, &action)?;
            println!("{}", id);
            Ok(())
        }
        Command::List => {
            for job in queue.list()? {
                println!(
                    "{:>6}  {:<7}  {:<20}  {:<38}  {}",
                    job.id,
                    job.status,
                    job.action,
                    job.subject_id,
                    job.updated_at.to_rfc3339()
                );
            }
            Ok(())
        }
        Command::Stats => {
            let stats = queue.stats()?;
            println!("todo: {}\ndoing: {}\nfailed: {}", stats.todo, stats.doing, stats.failed);
            Ok(())
        }
        Command::Delete { id } => {
            if !queue.delete(id)? {
                println!("job {} not found", id);
            }
            Ok(())
        }
        Command::DeleteAll => {
            println!("deleted {} jobs", queue.delete_all()?);
            Ok(())
        }
        Command::ResetAll => {
            println!("reset {} jobs", queue.reset_all()?);
            Ok(())
        }
        Command::Sweep => {
            println!("recovered {} jobs", queue.sweep(config.abandon_after())?);
            Ok(())
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| WorkerError::Runtime(e).into())
}

fn run_worker(config: &WorkerConfig, db: Database) -> Result<()> {
    let ctx = WorkerContext::from_config(config, db)?;
    let queue = ctx.queue.clone();

    if config.reset_on_startup {
        queue.reset_all()?;
    }

    let worker =
        Worker::new(ctx, config.categories.clone()).with_poll_interval(config.poll_interval());

    let sweeper = Sweeper::new(queue, config.sweep_interval(), config.abandon_after());
    let (trigger_tx, trigger_rx) = broadcast::channel(16);
    let sweeper_handle = sweeper.start(trigger_rx);

    let shutdown = worker.shutdown_flag();
    ctrlc::set_handler(move || {
        tracing::info!("Interrupt received, stopping after the current job");
        shutdown.store(true, Ordering::Release);
    })
    .map_err(|e| WorkerError::Signal(e.to_string()))?;

    runtime()?.block_on(worker.run());

    sweeper.stop();
    let _ = trigger_tx.send(());
    if sweeper_handle.join().is_err() {
        tracing::error!("Sweeper thread panicked");
    }

    Ok(())
}
