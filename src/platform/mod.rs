//! Messaging-platform abstraction layer.
//!
//! Defines the raw record shapes returned by the platform's two
//! messaging APIs, the capability traits the pipeline consumes
//! ([`MessagePlatform`] and [`ListStore`]), and the shared error type.
//!
//! Two concrete clients are implemented:
//! - [`twilio::TwilioPlatform`] — Programmable Messaging + Conversations REST APIs
//! - [`sync::TwilioSync`] — Sync REST API (the remote list store)
//!
//! Raw shapes never travel past the pipeline's normalizer; everything
//! downstream of it sees only canonical types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::warn;

pub mod sync;
pub mod twilio;

/// HTTP connect timeout for the shared reqwest client.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// HTTP request timeout for normal operations.
const REQUEST_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Raw record shapes
// ---------------------------------------------------------------------------

/// A platform-native message record, from either API.
///
/// `recipient` is populated only by the Messaging API; conversation
/// messages have no point-to-point recipient. `media` holds fully
/// resolved attachment URLs and is empty when the message carried none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Sender address (Messaging API) or author identity (Conversations API).
    pub author: String,
    /// Recipient address; Messaging API only.
    pub recipient: Option<String>,
    /// Message text.
    pub body: String,
    /// Creation timestamp.
    pub date_created: DateTime<Utc>,
    /// Attachment URLs, in source order.
    pub media: Vec<String>,
}

/// A conversation the queried identifier participates in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantConversation {
    /// Conversation SID.
    pub conversation_sid: String,
    /// When the conversation was last updated.
    pub date_updated: Option<DateTime<Utc>>,
    /// When the conversation was created.
    pub date_created: Option<DateTime<Utc>>,
}

/// A conversation with its full message list, eagerly materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConversation {
    /// Conversation SID.
    pub sid: String,
    /// When the conversation was last updated.
    pub date_updated: Option<DateTime<Utc>>,
    /// Every message in the conversation, in API order.
    pub messages: Vec<RawMessage>,
}

/// Handle to a Sync service resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncService {
    /// Service SID.
    pub sid: String,
}

/// Handle to a Sync list resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncList {
    /// List SID, used for deletion and item writes.
    pub sid: String,
    /// The unique name the list was created under.
    pub unique_name: String,
}

/// A single item read back from a Sync list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncItem {
    /// Zero-based position within the list.
    pub index: u64,
    /// The item's stored JSON payload.
    pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by platform API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport failure.
    #[error("platform request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The requested resource does not exist (HTTP 404).
    ///
    /// Recognized as a control-flow signal at service and list existence
    /// checks; fatal anywhere else it surfaces.
    #[error("resource not found")]
    NotFound,

    /// Upstream responded with a non-success, non-404 status.
    #[error("platform returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },

    /// Response did not match the expected wire schema.
    #[error("platform response parse error: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Read capabilities of the two messaging APIs.
///
/// Implementations must return fully materialized sequences; pagination
/// is the concrete client's concern, never the caller's.
#[async_trait]
pub trait MessagePlatform: Send + Sync {
    /// List every message sent *to* the address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    async fn list_messages_to(&self, address: &str) -> Result<Vec<RawMessage>, ApiError>;

    /// List every message sent *from* the address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    async fn list_messages_from(&self, address: &str) -> Result<Vec<RawMessage>, ApiError>;

    /// List every conversation the address participates in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    async fn list_participant_conversations(
        &self,
        address: &str,
    ) -> Result<Vec<ParticipantConversation>, ApiError>;

    /// List every message in a conversation.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    async fn list_conversation_messages(
        &self,
        conversation_sid: &str,
    ) -> Result<Vec<RawMessage>, ApiError>;
}

/// Capabilities of the remote key-value list store.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Fetch a service resource by SID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the service does not exist;
    /// other variants on transport, status, or parse failure.
    async fn fetch_service(&self, service_sid: &str) -> Result<SyncService, ApiError>;

    /// Create the service resource.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    async fn create_service(&self, service_sid: &str) -> Result<SyncService, ApiError>;

    /// Fetch a list by unique name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no list has that name; other
    /// variants on transport, status, or parse failure.
    async fn fetch_list(&self, service_sid: &str, name: &str) -> Result<SyncList, ApiError>;

    /// Delete a list by SID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    async fn delete_list(&self, service_sid: &str, list_sid: &str) -> Result<(), ApiError>;

    /// Create an empty list under a unique name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    async fn create_list(&self, service_sid: &str, name: &str) -> Result<SyncList, ApiError>;

    /// Append one item to a list.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    async fn create_item(
        &self,
        service_sid: &str,
        list_sid: &str,
        data: serde_json::Value,
    ) -> Result<(), ApiError>;

    /// Enumerate every item in a list, by unique name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no list has that name; other
    /// variants on transport, status, or parse failure.
    async fn list_items(&self, service_sid: &str, list_name: &str)
        -> Result<Vec<SyncItem>, ApiError>;
}

// ---------------------------------------------------------------------------
// HTTP helpers (shared by both concrete clients)
// ---------------------------------------------------------------------------

/// Build the shared HTTP client with connect and request timeouts.
pub(crate) fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to build HTTP client with timeouts, using default");
            reqwest::Client::default()
        })
}

/// Check an HTTP response and return its body text or a structured error.
///
/// A 404 becomes [`ApiError::NotFound`] so callers can branch on
/// existence; any other non-2xx becomes [`ApiError::Status`] with a
/// sanitized body.
///
/// # Errors
///
/// Returns `ApiError::Transport` on transport failure, `ApiError::NotFound`
/// on 404, `ApiError::Status` on any other non-2xx.
pub async fn check_response(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: sanitize_error_body(&body),
        });
    }
    Ok(body)
}

/// Collapse, redact, and truncate an upstream error body before it can
/// reach logs or error chains.
pub(crate) fn sanitize_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    // Auth tokens are bare 32-hex strings; resource SIDs carry a two-letter
    // prefix and so keep their word boundary intact.
    for pattern in [r"\b[0-9a-fA-F]{32}\b", r"Basic [A-Za-z0-9+/=]{8,}"] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}
