//! Check command - validate credentials with one login and fetch.

use anyhow::{Result, anyhow};
use clap::Args;
use tracing::info;
use wwpoints_core::{Account, Region};
use wwpoints_fetch::validate_account;
use wwpoints_store::{AccountConfig, Config, keychain};

use super::live_api;
use crate::output::{CheckOutput, JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat, exit};

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Regional site (see `wwpoints regions`).
    #[arg(long, short)]
    pub region: Region,

    /// Login name.
    #[arg(long, short)]
    pub username: String,

    /// Password; read from the keychain when omitted.
    #[arg(long, short)]
    pub password: Option<String>,
}

/// Runs the check command.
pub async fn run(args: &CheckArgs, cli: &Cli, config: &Config) -> Result<()> {
    let account = build_account(args)?;
    let id = account.id();
    let api = live_api(&config.poll_settings())?;

    info!(account = %id, "Checking credentials");
    let outcome = validate_account(api.as_ref(), &account).await;

    let (code, error) = match &outcome {
        Ok(_) => ("ok", None),
        Err(e) => (e.setup_code(), Some(e.to_string())),
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_check(&id, code, error.as_deref()));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = CheckOutput {
                account: id.to_string(),
                result: code,
                error,
            };
            println!("{}", formatter.format(&output)?);
        }
    }

    if let Err(e) = outcome {
        exit(ExitCode::from(e.into_poll_result().kind()));
    }
    Ok(())
}

fn build_account(args: &CheckArgs) -> Result<Account> {
    let entry = AccountConfig::new(args.region, args.username.as_str(), args.password.clone());
    entry.to_account_with(keychain::get_password).map_err(|e| {
        if e.is_credentials() {
            anyhow!("{e}; pass --password or store one with `wwpoints config add --keychain`")
        } else {
            e.into()
        }
    })
}
