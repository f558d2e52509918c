//! Remote service API client.
//!
//! The endpoint paths, headers, and cookies below are the remote service's
//! contract, not ours; they may change upstream and are kept inside this
//! module so nothing else depends on them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Local, NaiveDate, Utc};
use rand::Rng;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, COOKIE, LOCATION};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};
use wwpoints_core::{Account, PointsSnapshot, Region};

use crate::client::build_client;
use crate::error::FetchError;
use crate::parser::parse_points;
use crate::session::Session;
use crate::settings::PollSettings;

// ============================================================================
// Constants
// ============================================================================

/// Credential login endpoint (auth host).
const AUTHENTICATE_PATH: &str = "/login-apis/v1/authenticate";

/// OpenID authorize endpoint (auth host).
const AUTHORIZE_PATH: &str = "/openam/oauth2/authorize";

/// OAuth client id of the member web app.
const CLIENT_ID: &str = "webCMX";

/// Cookie value that opts out of tracking.
const PRIVACY_SETTINGS: &str = r#"{"doNotTrack":0,"doNotSell":0}"#;

/// Builds the day summary path for a date.
fn summary_path(date: NaiveDate) -> String {
    format!(
        "/api/v4/cmx/operations/composed/members/~/my-day-summary/{}",
        date.format("%Y-%m-%d")
    )
}

// ============================================================================
// Points API Trait
// ============================================================================

/// The two request shapes the pollers need from the remote service.
///
/// Implementations hold no per-account state; everything a call needs is
/// passed in.
#[async_trait]
pub trait PointsApi: Send + Sync {
    /// Logs in with the account's credentials.
    ///
    /// Rejected credentials are `FetchError::AuthenticationFailed`; network
    /// errors, timeouts, and unexpected statuses are transient.
    async fn login(&self, account: &Account) -> Result<Session, FetchError>;

    /// Fetches today's raw points payload using a session.
    ///
    /// A rejected session is `FetchError::AuthenticationFailed`. No retry
    /// happens here.
    async fn fetch_points(&self, session: &Session) -> Result<Value, FetchError>;
}

// ============================================================================
// Endpoints
// ============================================================================

/// Base URLs of the auth and data hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Auth host, e.g. `https://auth.weightwatchers.com`.
    pub auth_base: String,
    /// Data host, e.g. `https://cmx.weightwatchers.com`.
    pub cmx_base: String,
}

impl Endpoints {
    /// Endpoints of a region.
    pub fn for_region(region: Region) -> Self {
        Self {
            auth_base: region.auth_base_url(),
            cmx_base: region.cmx_base_url(),
        }
    }

    /// Explicit endpoints, used for every region.
    pub fn custom(auth_base: impl Into<String>, cmx_base: impl Into<String>) -> Self {
        Self {
            auth_base: auth_base.into().trim_end_matches('/').to_string(),
            cmx_base: cmx_base.into().trim_end_matches('/').to_string(),
        }
    }
}

// ============================================================================
// API Client
// ============================================================================

/// HTTP implementation of [`PointsApi`].
#[derive(Debug, Clone)]
pub struct WeightWatchersApi {
    http: reqwest::Client,
    endpoint_override: Option<Endpoints>,
}

impl WeightWatchersApi {
    /// Creates a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            http: build_client(timeout)?,
            endpoint_override: None,
        })
    }

    /// Creates a client from polling settings.
    pub fn from_settings(settings: &PollSettings) -> Result<Self, FetchError> {
        Self::new(settings.request_timeout)
    }

    /// Sends every request to the given endpoints instead of the region's hosts.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoint_override = Some(endpoints);
        self
    }

    fn endpoints(&self, region: Region) -> Endpoints {
        self.endpoint_override
            .clone()
            .unwrap_or_else(|| Endpoints::for_region(region))
    }

    /// Exchanges credentials for a login token.
    async fn authenticate(
        &self,
        endpoints: &Endpoints,
        account: &Account,
    ) -> Result<String, FetchError> {
        let url = format!("{}{}", endpoints.auth_base, AUTHENTICATE_PATH);
        debug!(url = %url, "Authenticating");

        let body = json!({
            "username": account.identifier(),
            "password": account.secret().expose_secret(),
            "rememberMe": true,
            "usernameEncoded": false,
            "retry": false,
        });

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if is_auth_rejection(status) {
            return Err(FetchError::AuthenticationFailed(
                "Invalid username, password, or region".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(FetchError::Unavailable(format!(
                "login request failed with HTTP {status}"
            )));
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, "Login response is not JSON");
            FetchError::Unavailable(format!("unreadable login response: {e}"))
        })?;

        body.pointer("/data/tokenId")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                FetchError::AuthenticationFailed(
                    "Login response did not include a session token".to_string(),
                )
            })
    }

    /// Exchanges a login token for the id token used as the session.
    async fn authorize(&self, endpoints: &Endpoints, token_id: &str) -> Result<String, FetchError> {
        let url = format!("{}{}", endpoints.auth_base, AUTHORIZE_PATH);
        debug!(url = %url, "Authorizing");

        let redirect_uri = format!("{}/auth", endpoints.cmx_base);
        let state = format!("{}/", endpoints.cmx_base);
        let nonce = random_nonce();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("response_type", "id_token"),
                ("client_id", CLIENT_ID),
                ("scope", "openid session"),
                ("redirect_uri", redirect_uri.as_str()),
                ("nonce", nonce.as_str()),
                ("state", state.as_str()),
            ])
            .header(ACCEPT, "*/*")
            .header(COOKIE, format!("wwAuth2={token_id}"))
            .send()
            .await?;

        let status = response.status();
        if is_auth_rejection(status) {
            return Err(FetchError::AuthenticationFailed(
                "Failed to authorize session".to_string(),
            ));
        }
        if status != StatusCode::FOUND && status != StatusCode::MOVED_PERMANENTLY {
            return Err(FetchError::Unavailable(format!(
                "authorize request failed with HTTP {status}"
            )));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        fragment_param(location, "id_token").ok_or_else(|| {
            FetchError::AuthenticationFailed(
                "Authorize response did not include an id token".to_string(),
            )
        })
    }

    /// Fetches the raw points payload for a specific date.
    #[instrument(skip(self, session), fields(account = %session.account().id()))]
    pub async fn fetch_points_for(
        &self,
        session: &Session,
        date: NaiveDate,
    ) -> Result<Value, FetchError> {
        let endpoints = self.endpoints(session.account().region());
        let url = format!("{}{}", endpoints.cmx_base, summary_path(date));
        debug!(url = %url, "Fetching points");

        let cookie = format!(
            "wwSession={}; ww_privacy_settings={}",
            session.token().expose_secret(),
            PRIVACY_SETTINGS
        );

        let response = self
            .http
            .get(&url)
            .query(&[("useHTS", "false"), ("useRounded", "false")])
            .header(ACCEPT, "application/json")
            .header(COOKIE, cookie)
            .send()
            .await?;

        let status = response.status();
        if is_auth_rejection(status) {
            return Err(FetchError::AuthenticationFailed(
                "Session is no longer valid".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(FetchError::Unavailable(format!(
                "points request failed with HTTP {status}"
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Failed to parse points response");
            FetchError::InvalidResponse(format!("JSON error: {e}"))
        })
    }
}

#[async_trait]
impl PointsApi for WeightWatchersApi {
    #[instrument(skip(self, account), fields(account = %account.id()))]
    async fn login(&self, account: &Account) -> Result<Session, FetchError> {
        let endpoints = self.endpoints(account.region());

        let token_id = self.authenticate(&endpoints, account).await?;
        let id_token = self.authorize(&endpoints, &token_id).await?;
        let expires_at = token_expiry(&id_token);

        debug!(has_expiry = expires_at.is_some(), "Session established");
        Ok(Session::new(id_token, Arc::new(account.clone())).with_expiry(expires_at))
    }

    async fn fetch_points(&self, session: &Session) -> Result<Value, FetchError> {
        self.fetch_points_for(session, Local::now().date_naive()).await
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Logs in, fetches, and parses once, without keeping the session.
///
/// Used to check credentials before an account is added.
pub async fn validate_account(
    api: &dyn PointsApi,
    account: &Account,
) -> Result<PointsSnapshot, FetchError> {
    let session = api.login(account).await?;
    let payload = api.fetch_points(&session).await?;
    Ok(parse_points(&payload)?)
}

// ============================================================================
// Helpers
// ============================================================================

fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

fn random_nonce() -> String {
    let bytes: [u8; 16] = rand::thread_rng().r#gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Reads a parameter from the fragment of a redirect location.
fn fragment_param(location: &str, key: &str) -> Option<String> {
    let (_, fragment) = location.split_once('#')?;
    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Reads the `exp` claim of a JWT, if the token is one.
pub(crate) fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    DateTime::from_timestamp(exp, 0)
}
