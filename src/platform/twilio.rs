//! REST client for the Programmable Messaging and Conversations APIs.
//!
//! Both APIs paginate; every list call here follows the pages to the end
//! and returns a fully materialized sequence, as the capability traits
//! require. Messages with media trigger one extra call to the media
//! subresource to resolve attachment URLs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::Endpoints;
use crate::credentials::Credentials;

use super::{
    build_http_client, check_response, ApiError, MessagePlatform, ParticipantConversation,
    RawMessage,
};

/// Messaging API version segment.
const MESSAGING_API_VERSION: &str = "2010-04-01";

/// Page size requested from the Messaging API.
const MESSAGE_PAGE_SIZE: &str = "100";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// One page of the Messaging API's message list.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct MessagePage {
    /// Messages on this page.
    pub messages: Vec<MessageResource>,
    /// Host-relative URI of the next page, if any.
    pub next_page_uri: Option<String>,
}

/// A Messaging API message resource.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct MessageResource {
    /// Message SID.
    pub sid: String,
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Message text; null for some media-only messages.
    pub body: Option<String>,
    /// Creation timestamp (RFC 2822 on this API).
    #[serde(deserialize_with = "rfc2822_utc")]
    pub date_created: DateTime<Utc>,
    /// Attached media count, as a decimal string.
    pub num_media: Option<String>,
    /// Subresource URIs, including the media list.
    pub subresource_uris: Option<SubresourceUris>,
}

/// Subresource URIs attached to a message resource.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct SubresourceUris {
    /// Host-relative URI of the message's media list.
    pub media: Option<String>,
}

/// One page of a message's media list.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct MediaPage {
    /// Media entries on this page.
    pub media_list: Vec<MediaResource>,
}

/// A media subresource entry.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct MediaResource {
    /// Host-relative URI of the media resource document.
    pub uri: String,
}

/// One page of the Conversations API's participant-conversation list.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ParticipantConversationsPage {
    /// Conversations on this page.
    pub conversations: Vec<ParticipantConversationResource>,
    /// Pagination block.
    #[serde(default)]
    pub meta: PageMeta,
}

/// A participant-conversation resource.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ParticipantConversationResource {
    /// Conversation SID.
    pub conversation_sid: String,
    /// When the conversation was last updated.
    pub conversation_date_updated: Option<DateTime<Utc>>,
    /// When the conversation was created.
    pub conversation_date_created: Option<DateTime<Utc>>,
}

/// One page of a conversation's message list.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ConversationMessagesPage {
    /// Messages on this page.
    pub messages: Vec<ConversationMessageResource>,
    /// Pagination block.
    #[serde(default)]
    pub meta: PageMeta,
}

/// A Conversations API message resource.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ConversationMessageResource {
    /// Author identity; null for some system-generated messages.
    pub author: Option<String>,
    /// Message text; null for media-only messages.
    pub body: Option<String>,
    /// Creation timestamp (ISO 8601 on this API).
    pub date_created: DateTime<Utc>,
}

/// Pagination metadata shared by the v1-style APIs.
#[doc(hidden)]
#[derive(Debug, Default, Deserialize)]
pub struct PageMeta {
    /// Absolute URL of the next page, if any.
    pub next_page_url: Option<String>,
}

fn rfc2822_utc<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc2822(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

// ---------------------------------------------------------------------------
// Pure parsing (testable without HTTP)
// ---------------------------------------------------------------------------

/// Parse one Messaging API message page.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] when the body does not match the wire schema.
pub fn parse_message_page(body: &str) -> Result<MessagePage, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Parse one media-list page.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] when the body does not match the wire schema.
pub fn parse_media_page(body: &str) -> Result<MediaPage, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Parse one participant-conversations page.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] when the body does not match the wire schema.
pub fn parse_participant_conversations_page(
    body: &str,
) -> Result<ParticipantConversationsPage, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Parse one conversation-messages page.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] when the body does not match the wire schema.
pub fn parse_conversation_messages_page(body: &str) -> Result<ConversationMessagesPage, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Resolve a media entry's public URL from its resource-document URI.
///
/// The API hands back `/2010-04-01/.../Media/ME….json`; the fetchable
/// content URL is the same path without the `.json` suffix.
pub fn media_url(base: &Url, uri: &str) -> String {
    let trimmed = uri.strip_suffix(".json").unwrap_or(uri);
    base.join(trimmed)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| trimmed.to_owned())
}

impl MessageResource {
    fn media_count(&self) -> u32 {
        self.num_media
            .as_deref()
            .and_then(|count| count.parse().ok())
            .unwrap_or(0)
    }

    fn into_raw(self, media: Vec<String>) -> RawMessage {
        RawMessage {
            author: self.from,
            recipient: Some(self.to),
            body: self.body.unwrap_or_default(),
            date_created: self.date_created,
            media,
        }
    }
}

impl ConversationMessageResource {
    fn into_raw(self) -> RawMessage {
        RawMessage {
            author: self.author.unwrap_or_default(),
            recipient: None,
            body: self.body.unwrap_or_default(),
            date_created: self.date_created,
            media: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// REST client for both messaging APIs, authenticated with basic auth.
pub struct TwilioPlatform {
    client: reqwest::Client,
    credentials: Credentials,
    messaging_base: Url,
    conversations_base: Url,
}

impl TwilioPlatform {
    /// Create a client from credentials and endpoint bases.
    pub fn new(credentials: Credentials, endpoints: &Endpoints) -> Self {
        Self {
            client: build_http_client(),
            credentials,
            messaging_base: endpoints.messaging.clone(),
            conversations_base: endpoints.conversations.clone(),
        }
    }

    async fn get(&self, url: Url) -> Result<String, ApiError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.account_sid, Some(self.credentials.auth_token()))
            .send()
            .await?;
        check_response(response).await
    }

    fn join(&self, base: &Url, path: &str) -> Result<Url, ApiError> {
        base.join(path)
            .map_err(|e| ApiError::Parse(format!("invalid request URL {path}: {e}")))
    }

    /// Follow the Messaging API message list filtered by one direction.
    async fn list_messages(&self, filter: &str, address: &str) -> Result<Vec<RawMessage>, ApiError> {
        let path = format!(
            "{MESSAGING_API_VERSION}/Accounts/{}/Messages.json",
            self.credentials.account_sid
        );
        let mut url = self.join(&self.messaging_base, &path)?;
        url.query_pairs_mut()
            .append_pair(filter, address)
            .append_pair("PageSize", MESSAGE_PAGE_SIZE);

        let mut all = Vec::new();
        loop {
            let body = self.get(url).await?;
            let MessagePage {
                messages,
                next_page_uri,
            } = parse_message_page(&body)?;
            for resource in messages {
                let media = self.resolve_media(&resource).await?;
                all.push(resource.into_raw(media));
            }
            match next_page_uri {
                Some(next) => url = self.join(&self.messaging_base, &next)?,
                None => break,
            }
        }
        debug!(filter, address, count = all.len(), "fetched message list");
        Ok(all)
    }

    /// Fetch a message's media subresource and resolve attachment URLs.
    async fn resolve_media(&self, resource: &MessageResource) -> Result<Vec<String>, ApiError> {
        if resource.media_count() == 0 {
            return Ok(Vec::new());
        }
        let Some(media_uri) = resource
            .subresource_uris
            .as_ref()
            .and_then(|uris| uris.media.as_deref())
        else {
            return Ok(Vec::new());
        };
        let url = self.join(&self.messaging_base, media_uri)?;
        let body = self.get(url).await?;
        let page = parse_media_page(&body)?;
        debug!(message_sid = %resource.sid, count = page.media_list.len(), "resolved media");
        Ok(page
            .media_list
            .iter()
            .map(|media| media_url(&self.messaging_base, &media.uri))
            .collect())
    }
}

#[async_trait]
impl MessagePlatform for TwilioPlatform {
    async fn list_messages_to(&self, address: &str) -> Result<Vec<RawMessage>, ApiError> {
        self.list_messages("To", address).await
    }

    async fn list_messages_from(&self, address: &str) -> Result<Vec<RawMessage>, ApiError> {
        self.list_messages("From", address).await
    }

    async fn list_participant_conversations(
        &self,
        address: &str,
    ) -> Result<Vec<ParticipantConversation>, ApiError> {
        let mut url = self.join(&self.conversations_base, "ParticipantConversations")?;
        url.query_pairs_mut().append_pair("Address", address);

        let mut all = Vec::new();
        loop {
            let body = self.get(url).await?;
            let page = parse_participant_conversations_page(&body)?;
            all.extend(
                page.conversations
                    .into_iter()
                    .map(|resource| ParticipantConversation {
                        conversation_sid: resource.conversation_sid,
                        date_updated: resource.conversation_date_updated,
                        date_created: resource.conversation_date_created,
                    }),
            );
            match page.meta.next_page_url {
                Some(next) => {
                    url = Url::parse(&next)
                        .map_err(|e| ApiError::Parse(format!("invalid next page URL: {e}")))?;
                }
                None => break,
            }
        }
        debug!(address, count = all.len(), "fetched participant conversations");
        Ok(all)
    }

    async fn list_conversation_messages(
        &self,
        conversation_sid: &str,
    ) -> Result<Vec<RawMessage>, ApiError> {
        let mut url = self.join(
            &self.conversations_base,
            &format!("Conversations/{conversation_sid}/Messages"),
        )?;

        let mut all = Vec::new();
        loop {
            let body = self.get(url).await?;
            let page = parse_conversation_messages_page(&body)?;
            all.extend(page.messages.into_iter().map(ConversationMessageResource::into_raw));
            match page.meta.next_page_url {
                Some(next) => {
                    url = Url::parse(&next)
                        .map_err(|e| ApiError::Parse(format!("invalid next page URL: {e}")))?;
                }
                None => break,
            }
        }
        debug!(conversation_sid, count = all.len(), "fetched conversation messages");
        Ok(all)
    }
}
