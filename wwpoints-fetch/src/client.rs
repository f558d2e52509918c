//! HTTP client construction.

use reqwest::{Client, redirect};
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("wwpoints/", env!("CARGO_PKG_VERSION"));

/// Builds the shared HTTP client.
///
/// Every request carries the given timeout, so no call can stay unresolved.
/// Redirects are never followed: the authorize step reads the token out of
/// the `Location` header of the redirect itself.
pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    debug!(timeout_secs = timeout.as_secs(), "Building HTTP client");

    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(USER_AGENT)
        .redirect(redirect::Policy::none())
        .build()
        .map_err(|e| FetchError::Unavailable(format!("failed to build HTTP client: {e}")))?;

    Ok(client)
}
