//! Points command - run one poll cycle per account and print the result.

use anyhow::{Result, bail};
use clap::Args;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};
use wwpoints_core::{Account, AccountId, PollResult};
use wwpoints_fetch::{AccountPoller, PointsApi, PollSettings};
use wwpoints_store::{Config, PointsStore, StoreError};

use super::live_api;
use crate::output::{AccountOutput, JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat, exit};

/// Arguments for the points command.
#[derive(Args, Default)]
pub struct PointsArgs {
    /// Only this account (`REGION:username`).
    #[arg(long, short)]
    pub account: Option<String>,
}

/// What one account produced.
enum Outcome {
    Polled(PollResult),
    Unusable(String),
}

/// Runs the points command.
pub async fn run(args: &PointsArgs, cli: &Cli, config: &Config) -> Result<()> {
    let mut resolved = config.resolve_accounts();
    if let Some(wanted) = &args.account {
        resolved.retain(|(id, _)| id.as_str().eq_ignore_ascii_case(wanted));
        if resolved.is_empty() {
            bail!("Unknown account: {wanted}");
        }
    }
    if resolved.is_empty() {
        bail!("No accounts configured; add one with `wwpoints config add`");
    }

    let settings = config.poll_settings();
    let api = live_api(&settings)?;
    let store = Arc::new(PointsStore::new());

    info!(accounts = resolved.len(), "Polling accounts");
    let outcomes = poll_all(resolved, &api, &store, &settings).await;

    print_outcomes(&outcomes, cli)?;

    if let Some(code) = failure_code(&outcomes) {
        exit(code);
    }
    Ok(())
}

/// Runs one cycle for every usable account concurrently.
async fn poll_all(
    resolved: Vec<(AccountId, Result<Account, StoreError>)>,
    api: &Arc<dyn PointsApi>,
    store: &Arc<PointsStore>,
    settings: &PollSettings,
) -> Vec<(AccountId, Outcome)> {
    let futures = resolved.into_iter().map(|(id, account)| {
        let api = Arc::clone(api);
        let store = Arc::clone(store);
        let reauth = settings.reauth;
        async move {
            match account {
                Ok(account) => {
                    let poller = AccountPoller::new(Arc::new(account), api, store, reauth);
                    let outcome = poller.run_cycle().await;
                    match outcome.result() {
                        Some(result) => (id, Outcome::Polled(result.clone())),
                        None => (id, Outcome::Unusable("Cycle did not complete".into())),
                    }
                }
                Err(e) => {
                    debug!(account = %id, error = %e, "Skipping account");
                    (id, Outcome::Unusable(e.to_string()))
                }
            }
        }
    });

    join_all(futures).await
}

fn print_outcomes(outcomes: &[(AccountId, Outcome)], cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let blocks: Vec<String> = outcomes
                .iter()
                .map(|(id, outcome)| match outcome {
                    Outcome::Polled(result) => formatter.format_result(id, result),
                    Outcome::Unusable(error) => {
                        formatter.format_error(&id.to_string(), "Config error", error)
                    }
                })
                .collect();
            println!("{}", blocks.join("\n\n"));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output: Vec<AccountOutput> = outcomes
                .iter()
                .map(|(id, outcome)| match outcome {
                    Outcome::Polled(result) => formatter.cycle_output(id, result),
                    Outcome::Unusable(error) => formatter.config_error_output(id, error),
                })
                .collect();
            println!("{}", formatter.format(&output)?);
        }
    }
    Ok(())
}

/// Exit code when no account produced a snapshot: the first failure's kind.
fn failure_code(outcomes: &[(AccountId, Outcome)]) -> Option<ExitCode> {
    let any_success = outcomes
        .iter()
        .any(|(_, o)| matches!(o, Outcome::Polled(r) if r.is_success()));
    if any_success {
        return None;
    }

    let first = outcomes.iter().find_map(|(_, o)| match o {
        Outcome::Polled(result) => Some(ExitCode::from(result.kind())),
        Outcome::Unusable(_) => None,
    });
    Some(first.unwrap_or(ExitCode::Error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wwpoints_core::{PointsSnapshot, PollResultKind, Region};

    fn id(name: &str) -> AccountId {
        AccountId::new(Region::Us, name)
    }

    #[test]
    fn test_any_success_exits_zero() {
        let outcomes = vec![
            (id("a"), Outcome::Polled(PollResult::AuthFailure("no".into()))),
            (
                id("b"),
                Outcome::Polled(PollResult::Success(PointsSnapshot::new(1.0, 2.0, 3.0, 4.0))),
            ),
        ];
        assert!(failure_code(&outcomes).is_none());
    }

    #[test]
    fn test_first_failure_kind_wins() {
        let outcomes = vec![
            (id("a"), Outcome::Unusable("missing password".into())),
            (id("b"), Outcome::Polled(PollResult::TransientFailure("down".into()))),
            (id("c"), Outcome::Polled(PollResult::AuthFailure("no".into()))),
        ];
        assert_eq!(failure_code(&outcomes), Some(ExitCode::TransientFailure));
    }

    #[test]
    fn test_only_config_errors_is_general_error() {
        let outcomes = vec![(id("a"), Outcome::Unusable("missing password".into()))];
        assert_eq!(failure_code(&outcomes), Some(ExitCode::Error));
        assert_eq!(
            ExitCode::from(PollResultKind::ParseFailure),
            ExitCode::ParseFailure
        );
    }
}
