use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::protocol::ChatEvent;
use storage::{CounterStore, FileCounterStore};
use tally::Dispatcher;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};
use tracing::warn;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "nonprimesubs.txt")]
    output_file: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored count.
    Show,
    /// Overwrite the stored count.
    Set {
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
    /// Run a recorded relay log through the counter offline.
    Replay { log: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    let cli = Cli::parse();
    let store = FileCounterStore::new(&cli.output_file);

    match cli.command {
        Command::Show => {
            let subs = store.read().await?;
            println!("{subs}");
        }
        Command::Set { value } => {
            store.save(value).await?;
            println!("subcount set to {value}");
        }
        Command::Replay { log } => {
            let report = replay_log(store, &log).await?;
            println!(
                "replayed {} events ({} skipped), subcount now {}",
                report.applied, report.skipped, report.subs
            );
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReplayReport {
    applied: usize,
    skipped: usize,
    subs: i64,
}

/// Unlike the live replay, bad lines are skipped rather than ending the run.
async fn replay_log<S: CounterStore>(store: S, log: &Path) -> Result<ReplayReport> {
    let file = File::open(log)
        .await
        .with_context(|| format!("failed to open event log '{}'", log.display()))?;
    let mut dispatcher = Dispatcher::from_store(store).await;

    let mut report = ReplayReport {
        applied: 0,
        skipped: 0,
        subs: dispatcher.state().subs(),
    };
    let mut lines = BufReader::new(file).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("failed to read event log '{}'", log.display()))?
    {
        if line.trim().is_empty() {
            continue;
        }
        match ChatEvent::parse(&line) {
            Ok(event) => {
                dispatcher.handle(&event).await;
                report.applied += 1;
            }
            Err(error) => {
                warn!(%error, %line, "skipping unparsable line");
                report.skipped += 1;
            }
        }
    }

    report.subs = dispatcher.state().subs();
    Ok(report)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
