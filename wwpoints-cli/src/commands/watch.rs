//! Watch command - keep every account polling and redraw on change.

use anyhow::{Result, bail};
use clap::Args;
use std::io::{Write, stdout};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use wwpoints_fetch::PollingSupervisor;
use wwpoints_store::{Config, PointsStore};

use super::live_api;
use crate::output::{AccountOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to the configured one).
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// Minimum interval to use.
    #[arg(long, default_value = "60")]
    pub min_interval: u64,
}

/// Runs the watch command until Ctrl+C.
pub async fn run(args: &WatchArgs, cli: &Cli, config: &Config) -> Result<()> {
    let mut settings = config.poll_settings();
    if let Some(secs) = args.interval {
        settings.interval = Duration::from_secs(secs.max(args.min_interval));
    }

    let api = live_api(&settings)?;
    let store = Arc::new(PointsStore::new());
    let supervisor = PollingSupervisor::new(api, Arc::clone(&store), settings.clone());

    for (id, account) in config.resolve_accounts() {
        match account {
            Ok(account) => supervisor.start(account).await?,
            Err(e) => warn!(account = %id, error = %e, "Not polling account"),
        }
    }
    if supervisor.running().await.is_empty() {
        bail!("No usable accounts configured");
    }

    info!(interval = settings.interval.as_secs(), "Starting watch mode");

    let mut changes = store.subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                redraw(&store, cli, settings.interval).await?;
            }
        }
    }

    supervisor.shutdown().await;
    Ok(())
}

async fn redraw(store: &PointsStore, cli: &Cli, interval: Duration) -> Result<()> {
    let states = store.all().await;

    match cli.format {
        OutputFormat::Text => {
            // Clear screen
            print!("\x1b[2J\x1b[H");
            stdout().flush()?;

            let now = chrono::Local::now();
            println!(
                "wwpoints Watch Mode - {} (refresh: {}s)",
                now.format("%H:%M:%S"),
                interval.as_secs()
            );
            println!("{}", "─".repeat(50));
            println!();

            let formatter = TextFormatter::new(!cli.no_color);
            for (id, state) in &states {
                println!("{}", formatter.format_state(id, state));
                println!();
            }
            println!("Press Ctrl+C to exit");
        }
        OutputFormat::Json => {
            // One line per update so the stream can be piped.
            let formatter = JsonFormatter::new(false);
            let output: Vec<AccountOutput> = states
                .iter()
                .map(|(id, state)| formatter.state_output(id, state))
                .collect();
            println!("{}", formatter.format(&output)?);
        }
    }
    Ok(())
}
