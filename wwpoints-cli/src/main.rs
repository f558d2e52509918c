// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! wwpoints CLI - WeightWatchers points from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Show points for every configured account
//! wwpoints
//!
//! # JSON output
//! wwpoints --format json --pretty
//!
//! # Poll on the configured interval and redraw
//! wwpoints watch
//!
//! # Check credentials without saving them
//! wwpoints check --region UK --username sam@example.co.uk
//!
//! # Add an account, keeping the password in the keychain
//! wwpoints config add --region US --username jane@example.com --keychain
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wwpoints_core::PollResultKind;
use wwpoints_store::{Config, LogLevel};

use commands::{check, config, points, regions, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// wwpoints CLI - WeightWatchers points monitoring.
#[derive(Parser)]
#[command(name = "wwpoints")]
#[command(about = "WeightWatchers points monitoring CLI")]
#[command(long_about = r#"
wwpoints logs in to WeightWatchers and reports four numbers per account:

  • Daily points remaining
  • Daily points used
  • Daily activity points earned
  • Weekly points remaining

Examples:
  wwpoints                       # Points for all configured accounts
  wwpoints --format json         # JSON output
  wwpoints watch                 # Keep polling and redraw
  wwpoints regions               # Supported regional sites
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'points' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file to use instead of the default location.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// The config file this invocation reads and writes.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run one poll cycle per account (default if no command specified).
    #[command(visible_alias = "p")]
    Points(points::PointsArgs),

    /// Poll every account on its interval and redraw on change.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Check credentials against the service.
    Check(check::CheckArgs),

    /// List supported regions.
    #[command(visible_alias = "r")]
    Regions,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Credentials rejected.
    AuthFailure = 2,
    /// Response could not be parsed.
    ParseFailure = 3,
    /// Service unreachable or timed out.
    TransientFailure = 4,
}

impl From<PollResultKind> for ExitCode {
    fn from(kind: PollResultKind) -> Self {
        match kind {
            PollResultKind::Success => ExitCode::Success,
            PollResultKind::AuthFailure => ExitCode::AuthFailure,
            PollResultKind::ParseFailure => ExitCode::ParseFailure,
            PollResultKind::TransientFailure => ExitCode::TransientFailure,
        }
    }
}

/// Exits the process with the given code.
pub fn exit(code: ExitCode) -> ! {
    std::process::exit(code as i32)
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("wwpoints=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("wwpoints={level}")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Reads the config file, falling back to defaults when it does not exist.
async fn load_config(path: &Path) -> Result<Config> {
    Ok(Config::load_from(path).await?)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config_path();

    let loaded = load_config(&config_path).await;
    let level = loaded
        .as_ref()
        .map_or(LogLevel::default(), |c| c.general.log_level);
    setup_logging(cli.verbose, cli.quiet, level);

    let result = match (&cli.command, loaded) {
        (Some(Commands::Regions), _) => regions::run(&cli),
        (Some(Commands::Check(args)), loaded) => {
            check::run(args, &cli, &loaded.unwrap_or_default()).await
        }
        (Some(Commands::Config(args)), loaded) => config::run(args, &cli, loaded).await,
        (_, Err(e)) => Err(e),
        (Some(Commands::Points(args)), Ok(config)) => points::run(args, &cli, &config).await,
        (Some(Commands::Watch(args)), Ok(config)) => watch::run(args, &cli, &config).await,
        (None, Ok(config)) => points::run(&points::PointsArgs::default(), &cli, &config).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        exit(ExitCode::Error);
    }

    Ok(())
}
