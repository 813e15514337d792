//! Run configuration assembled from the process environment.
//!
//! Everything the pipeline needs at the process boundary lives here:
//! platform credentials, the fixed target Sync service SID, and the three
//! API endpoint bases (overridable for testing against a local stub).

use std::collections::BTreeMap;

use url::Url;

use crate::credentials::{Credentials, ACCOUNT_SID_VAR, AUTH_TOKEN_VAR};

/// Environment variable holding the target Sync service SID.
pub const SYNC_SERVICE_SID_VAR: &str = "MSGSYNC_SYNC_SERVICE_SID";

/// Environment variable overriding the Messaging API base URL.
pub const MESSAGING_URL_VAR: &str = "MSGSYNC_MESSAGING_URL";

/// Environment variable overriding the Conversations API base URL.
pub const CONVERSATIONS_URL_VAR: &str = "MSGSYNC_CONVERSATIONS_URL";

/// Environment variable overriding the Sync API base URL.
pub const SYNC_URL_VAR: &str = "MSGSYNC_SYNC_URL";

const DEFAULT_MESSAGING_URL: &str = "https://api.twilio.com/";
const DEFAULT_CONVERSATIONS_URL: &str = "https://conversations.twilio.com/v1/";
const DEFAULT_SYNC_URL: &str = "https://sync.twilio.com/v1/";

/// Base URLs for the three platform APIs.
///
/// All bases carry a trailing slash so resource paths can be joined
/// relative to them.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Programmable Messaging API base.
    pub messaging: Url,
    /// Conversations API base.
    pub conversations: Url,
    /// Sync API base.
    pub sync: Url,
}

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Platform REST credentials.
    pub credentials: Credentials,
    /// SID of the Sync service that owns all published lists.
    pub sync_service_sid: String,
    /// API endpoint bases.
    pub endpoints: Endpoints,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or an endpoint
    /// override is not a valid URL.
    pub fn from_env() -> anyhow::Result<Self> {
        let vars: BTreeMap<String, String> = std::env::vars().collect();
        Self::from_lookup(&vars)
    }

    /// Build configuration from an explicit variable map.
    ///
    /// Split out from [`Config::from_env`] so tests can exercise the full
    /// resolution logic without touching process-global state.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or an endpoint
    /// override is not a valid URL.
    pub fn from_lookup(vars: &BTreeMap<String, String>) -> anyhow::Result<Self> {
        let credentials = Credentials::from_lookup(vars)?;
        let sync_service_sid = vars
            .get(SYNC_SERVICE_SID_VAR)
            .filter(|value| !value.trim().is_empty())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing required variable: {SYNC_SERVICE_SID_VAR}"))?;
        let endpoints = Endpoints {
            messaging: endpoint(vars, MESSAGING_URL_VAR, DEFAULT_MESSAGING_URL)?,
            conversations: endpoint(vars, CONVERSATIONS_URL_VAR, DEFAULT_CONVERSATIONS_URL)?,
            sync: endpoint(vars, SYNC_URL_VAR, DEFAULT_SYNC_URL)?,
        };
        Ok(Self {
            credentials,
            sync_service_sid,
            endpoints,
        })
    }
}

fn endpoint(vars: &BTreeMap<String, String>, key: &str, default: &str) -> anyhow::Result<Url> {
    let raw = vars.get(key).map_or(default, String::as_str);
    // Join semantics require a trailing slash, otherwise the last path
    // segment of the base is silently replaced.
    let normalized = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| anyhow::anyhow!("invalid URL in {key}: {e}"))
}
