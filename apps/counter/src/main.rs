use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use relay_client::{
    activity::{announce_first_message, report_velocity_every, FIRST_MESSAGE_POLL, VELOCITY_PERIOD},
    ActivityCounter, Ingress, RelayClient,
};
use storage::FileCounterStore;
use tally::{event_queue, Dispatcher};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, resolve_config_path, CONFIG_PATH_ENV};

/// Keeps a running count of non-Prime subscriptions for one channel and
/// mirrors it into a text file.
#[derive(Parser, Debug)]
struct Args {
    /// Config file (JSON, or TOML when the name ends in `.toml`).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config_path = resolve_config_path(args.config, std::env::var(CONFIG_PATH_ENV).ok());
    let settings = load_settings(&config_path)?;

    init_tracing(settings.debug_log);
    info!(cfg_path = %config_path.display(), "loaded config");

    let (events, inbox) = event_queue();
    let activity = ActivityCounter::default();
    let mut client = RelayClient::connect(
        settings.relay_settings(),
        Ingress::new(events, activity.clone()),
    )
    .await
    .context("failed to dial IRC address multiple times, aborting")?;

    let dispatcher = Dispatcher::from_store(FileCounterStore::new(&settings.output_file)).await;
    let dispatcher_task = tokio::spawn(dispatcher.run(inbox));

    let channel = client.settings().channel.clone();
    tokio::spawn(announce_first_message(activity.clone(), channel, FIRST_MESSAGE_POLL));
    tokio::spawn(report_velocity_every(activity, VELOCITY_PERIOD));

    if let Some(path) = settings.debug_input_file.as_deref() {
        client
            .replay_file(Path::new(path))
            .await
            .context("failure while replaying debug input")?;
    }

    let outcome = tokio::select! {
        result = client.run() => result.context("failure during IRC run"),
        signal = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            signal.context("failed to listen for shutdown signal")
        }
    };

    // The client owned the only sender; the dispatcher finishes whatever is
    // still queued and stops.
    match dispatcher_task.await {
        Ok(state) => info!(subs = state.subs(), "final subcount"),
        Err(join_error) => error!(%join_error, "dispatcher task failed"),
    }

    outcome
}

fn init_tracing(debug_log: bool) {
    let default_level = if debug_log { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
