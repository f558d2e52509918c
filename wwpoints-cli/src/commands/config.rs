//! Config command - manage configuration.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use tracing::info;
use wwpoints_core::{AccountId, Region};
use wwpoints_fetch::validate_account;
use wwpoints_store::{AccountConfig, Config, default_config_dir, keychain};

use super::live_api;
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Add an account.
    Add {
        /// Regional site.
        #[arg(long, short)]
        region: Region,

        /// Login name.
        #[arg(long, short)]
        username: String,

        /// Password.
        #[arg(long, short)]
        password: String,

        /// Keep the password in the system keychain instead of the file.
        #[arg(long)]
        keychain: bool,

        /// Save without logging in first.
        #[arg(long)]
        no_validate: bool,
    },

    /// Remove an account.
    Remove {
        /// Account id (`REGION:username`).
        account: String,
    },

    /// Set the polling interval.
    Interval {
        /// Seconds between cycles.
        seconds: u64,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, loaded: Result<Config>) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(&loaded?, cli),
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Add {
            region,
            username,
            password,
            keychain,
            no_validate,
        } => {
            let entry = AccountConfig::new(*region, username.as_str(), Some(password.clone()));
            add_account(loaded?, entry, *keychain, !*no_validate, cli).await
        }
        ConfigAction::Remove { account } => remove_account(loaded?, account, cli).await,
        ConfigAction::Interval { seconds } => set_interval(loaded?, *seconds, cli).await,
        ConfigAction::Reset => reset_config(cli).await,
    }
}

fn show_config(config: &Config, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            println!("wwpoints Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Accounts:");
            if config.accounts.is_empty() {
                println!("  (none)");
            }
            for account in &config.accounts {
                let source = if account.password.is_some() {
                    "config file"
                } else {
                    "keychain"
                };
                println!("  • {} (password: {source})", account.id());
            }
            println!();
            println!("Refresh interval: {}s", config.general.refresh_interval);
            println!("Request timeout: {}s", config.general.request_timeout);
            println!("Re-login attempts: {}", config.general.max_reauth_attempts);
            println!("Log level: {}", config.general.log_level);
        }
        OutputFormat::Json => {
            let mut redacted = config.clone();
            for account in &mut redacted.accounts {
                if account.password.is_some() {
                    account.password = Some("[REDACTED]".into());
                }
            }
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&redacted)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_file = cli.config_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", config_file.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_file.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn add_account(
    mut config: Config,
    mut entry: AccountConfig,
    use_keychain: bool,
    validate: bool,
    cli: &Cli,
) -> Result<()> {
    let id = entry.id();
    if config.find_account(&id).is_some() {
        bail!("Account already configured: {id}");
    }

    let account = entry.to_account_with(|_| None)?;
    if validate {
        let api = live_api(&config.poll_settings())?;
        if let Err(e) = validate_account(api.as_ref(), &account).await {
            bail!("{} ({e})", e.setup_code());
        }
    }

    if use_keychain {
        if let Some(password) = entry.password.take() {
            keychain::store_password(&id, &password)?;
        }
    }

    config.add_account(entry)?;
    config.save_to(&cli.config_path()).await?;

    info!(account = %id, "Account added");
    println!("Added: {id}");
    Ok(())
}

async fn remove_account(mut config: Config, wanted: &str, cli: &Cli) -> Result<()> {
    let id = parse_account_id(wanted)?;
    let removed = config.remove_account(&id)?;
    if removed.password.is_none() {
        keychain::delete_password(&id)?;
    }
    config.save_to(&cli.config_path()).await?;

    info!(account = %id, "Account removed");
    println!("Removed: {id}");
    Ok(())
}

async fn set_interval(mut config: Config, seconds: u64, cli: &Cli) -> Result<()> {
    if seconds == 0 {
        bail!("Interval must be at least one second");
    }
    config.general.refresh_interval = seconds;
    config.save_to(&cli.config_path()).await?;

    info!(seconds, "Refresh interval updated");
    println!("Refresh interval set to: {seconds}s");
    Ok(())
}

async fn reset_config(cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    if tokio::fs::try_exists(&path).await? {
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Config reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}

/// Parses `REGION:username` into an id.
fn parse_account_id(raw: &str) -> Result<AccountId> {
    let Some((region, username)) = raw.split_once(':') else {
        bail!("Expected REGION:username, got {raw}");
    };
    let region: Region = region.parse()?;
    Ok(AccountId::new(region, username))
}
