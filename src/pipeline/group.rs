//! Canonical message-group model.
//!
//! The single shape every raw record is folded into, and the run-wide
//! accumulator that carries groups from both APIs to the publisher.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::RawMessage;

/// Which upstream API a group came from.
///
/// Serialized under the names the stored items have always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// The direct-messaging API.
    #[serde(rename = "MessagingAPI")]
    MessagingApi,
    /// The multi-party conversation API.
    #[serde(rename = "ConversationsAPI")]
    ConversationsApi,
}

/// A message in the unified shape, regardless of source API.
///
/// `attachments` is `None` — and entirely absent from the serialized
/// form — when the source record carried no media. A message with media
/// always has a non-empty list preserving source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMessage {
    /// The sending party.
    pub author: String,
    /// Message text.
    pub body: String,
    /// When the message was created upstream.
    #[serde(rename = "dateSent")]
    pub date_sent: DateTime<Utc>,
    /// Attachment URLs, when the source record carried media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
}

impl CanonicalMessage {
    /// Fold a raw platform record into the canonical shape.
    pub fn from_raw(raw: &RawMessage) -> Self {
        Self {
            author: raw.author.clone(),
            body: raw.body.clone(),
            date_sent: raw.date_created,
            attachments: if raw.media.is_empty() {
                None
            } else {
                Some(raw.media.clone())
            },
        }
    }
}

/// An ordered run of canonical messages sharing one group key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageGroup {
    /// Messages in the group, in normalization order.
    pub messages: Vec<CanonicalMessage>,
    /// Which API produced the group.
    pub source: Source,
}

/// The run-wide accumulator: group key → message group.
///
/// Keys are either counterpart addresses (direct path) or conversation
/// SIDs (conversation path); the two key spaces are never reconciled.
/// A `BTreeMap` keeps publish order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedMapping {
    groups: BTreeMap<String, MessageGroup>,
}

impl UnifiedMapping {
    /// Absorb a normalized mapping, replacing whole groups on key collision.
    ///
    /// Last write wins; message lists are never concatenated across
    /// normalization passes.
    pub fn absorb(&mut self, incoming: BTreeMap<String, MessageGroup>) {
        for (key, group) in incoming {
            self.groups.insert(key, group);
        }
    }

    /// Number of groups accumulated so far.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no groups have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The group stored under a key, if any.
    pub fn get(&self, key: &str) -> Option<&MessageGroup> {
        self.groups.get(key)
    }

    /// Iterate groups in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MessageGroup)> {
        self.groups.iter()
    }
}
