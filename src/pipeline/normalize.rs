//! Source adapters and normalizers.
//!
//! One fetch function per upstream API, each returning that API's
//! native shape, and one normalizer per shape folding it into the
//! canonical `group key → message group` mapping.

use std::collections::BTreeMap;

use tracing::info;

use crate::platform::{ApiError, MessagePlatform, RawConversation, RawMessage};

use super::group::{CanonicalMessage, MessageGroup, Source};

/// Everything the direct-messaging API returned for one address.
#[derive(Debug, Clone)]
pub struct DirectFetch {
    /// Messages to and from the address, concatenated (to-list first).
    pub messages: Vec<RawMessage>,
    /// Always [`Source::MessagingApi`].
    pub source: Source,
}

/// Fetch all direct messages where the address is sender or recipient.
///
/// The two result sets are concatenated without dedup: a message cannot
/// be both to and from the same address.
///
/// # Errors
///
/// Propagates any collaborator failure.
pub async fn fetch_direct_messages(
    platform: &dyn MessagePlatform,
    address: &str,
) -> Result<DirectFetch, ApiError> {
    info!(address, "fetching messages from the Messaging API");
    let mut messages = platform.list_messages_to(address).await?;
    messages.extend(platform.list_messages_from(address).await?);
    Ok(DirectFetch {
        messages,
        source: Source::MessagingApi,
    })
}

/// Fetch every conversation the identifier participates in, with each
/// conversation's full message list materialized eagerly.
///
/// One upstream call per conversation found; the N+1 shape is an
/// accepted cost of the conversation API.
///
/// # Errors
///
/// Propagates any collaborator failure.
pub async fn fetch_conversations(
    platform: &dyn MessagePlatform,
    identifier: &str,
) -> Result<Vec<RawConversation>, ApiError> {
    info!(identifier, "fetching messages from the Conversations API");
    let participations = platform.list_participant_conversations(identifier).await?;
    let mut conversations = Vec::with_capacity(participations.len());
    for participation in participations {
        let messages = platform
            .list_conversation_messages(&participation.conversation_sid)
            .await?;
        conversations.push(RawConversation {
            sid: participation.conversation_sid,
            date_updated: participation.date_updated,
            messages,
        });
    }
    Ok(conversations)
}

/// Group direct messages by the conversation counterpart.
///
/// The group key is whichever endpoint of each message is NOT the
/// queried address, so a group can never be keyed by the address itself.
pub fn normalize_direct(fetch: &DirectFetch, address: &str) -> BTreeMap<String, MessageGroup> {
    let mut grouped: BTreeMap<String, MessageGroup> = BTreeMap::new();
    for message in &fetch.messages {
        let counterpart = if message.author == address {
            message.recipient.as_deref()
        } else {
            Some(message.author.as_str())
        };
        let Some(counterpart) = counterpart else {
            continue;
        };
        grouped
            .entry(counterpart.to_owned())
            .or_insert_with(|| MessageGroup {
                messages: Vec::new(),
                source: fetch.source,
            })
            .messages
            .push(CanonicalMessage::from_raw(message));
    }
    grouped
}

/// Group conversation messages by conversation SID, one group per
/// conversation. No merging happens at this stage even when two
/// conversations share a counterpart.
pub fn normalize_conversations(raws: &[RawConversation]) -> BTreeMap<String, MessageGroup> {
    raws.iter()
        .map(|conversation| {
            let messages = conversation
                .messages
                .iter()
                .map(CanonicalMessage::from_raw)
                .collect();
            (
                conversation.sid.clone(),
                MessageGroup {
                    messages,
                    source: Source::ConversationsApi,
                },
            )
        })
        .collect()
}
