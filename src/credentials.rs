//! Platform credential loading from the process environment.

use std::collections::BTreeMap;

/// Environment variable holding the platform account SID.
pub const ACCOUNT_SID_VAR: &str = "TWILIO_ACCOUNT_SID";

/// Environment variable holding the platform auth token.
pub const AUTH_TOKEN_VAR: &str = "TWILIO_AUTH_TOKEN";

/// REST credentials for the messaging platform.
///
/// The auth token is kept private and redacted from `Debug` output so it
/// never ends up in logs or error chains.
#[derive(Clone)]
pub struct Credentials {
    /// Platform account SID, used both for authentication and in
    /// Messaging API resource paths.
    pub account_sid: String,
    auth_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from explicit values.
    pub fn new(account_sid: String, auth_token: String) -> Self {
        Self {
            account_sid,
            auth_token,
        }
    }

    /// Returns the auth token for use as the basic-auth password.
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Load credentials through an environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error when either variable is missing or empty.
    pub fn from_lookup(vars: &BTreeMap<String, String>) -> anyhow::Result<Self> {
        let account_sid = require(vars, ACCOUNT_SID_VAR)?;
        let auth_token = require(vars, AUTH_TOKEN_VAR)?;
        Ok(Self {
            account_sid,
            auth_token,
        })
    }
}

fn require(vars: &BTreeMap<String, String>, key: &str) -> anyhow::Result<String> {
    vars.get(key)
        .filter(|value| !value.trim().is_empty())
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing required credential: {key}"))
}
