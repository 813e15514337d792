//! Normalizer tests: raw records folding into canonical groups.

use chrono::{TimeZone, Utc};
use serde_json::json;

use msgsync::pipeline::group::{CanonicalMessage, Source};
use msgsync::pipeline::normalize::{normalize_conversations, normalize_direct, DirectFetch};
use msgsync::platform::{RawConversation, RawMessage};

fn raw(author: &str, recipient: Option<&str>, body: &str) -> RawMessage {
    RawMessage {
        author: author.to_owned(),
        recipient: recipient.map(str::to_owned),
        body: body.to_owned(),
        date_created: Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
        media: Vec::new(),
    }
}

fn direct(messages: Vec<RawMessage>) -> DirectFetch {
    DirectFetch {
        messages,
        source: Source::MessagingApi,
    }
}

#[test]
fn direct_groups_key_on_the_counterpart() {
    let fetch = direct(vec![
        raw("+2222", Some("+1111"), "inbound"),
        raw("+1111", Some("+3333"), "outbound"),
    ]);
    let grouped = normalize_direct(&fetch, "+1111");

    assert_eq!(grouped.len(), 2);
    assert!(grouped.contains_key("+2222"));
    assert!(grouped.contains_key("+3333"));
    assert!(!grouped.contains_key("+1111"));
}

#[test]
fn direct_appends_repeat_counterpart_messages_in_order() {
    let fetch = direct(vec![
        raw("+2222", Some("+1111"), "first"),
        raw("+1111", Some("+2222"), "second"),
    ]);
    let grouped = normalize_direct(&fetch, "+1111");

    let group = grouped.get("+2222").expect("group for the counterpart");
    assert_eq!(group.messages.len(), 2);
    assert_eq!(group.messages[0].body, "first");
    assert_eq!(group.messages[1].body, "second");
}

#[test]
fn direct_skips_messages_without_a_counterpart() {
    let fetch = direct(vec![raw("+1111", None, "no recipient")]);
    let grouped = normalize_direct(&fetch, "+1111");
    assert!(grouped.is_empty());
}

#[test]
fn direct_groups_carry_the_messaging_source() {
    let fetch = direct(vec![raw("+2222", Some("+1111"), "hi")]);
    let grouped = normalize_direct(&fetch, "+1111");
    let group = grouped.get("+2222").expect("group for the counterpart");
    assert_eq!(group.source, Source::MessagingApi);
}

#[test]
fn conversations_map_one_to_one_onto_groups() {
    let raws = vec![
        RawConversation {
            sid: "CH0001".to_owned(),
            date_updated: None,
            messages: vec![raw("alice", None, "hello"), raw("bob", None, "hey")],
        },
        RawConversation {
            sid: "CH0002".to_owned(),
            date_updated: None,
            messages: vec![raw("carol", None, "yo")],
        },
    ];
    let grouped = normalize_conversations(&raws);

    assert_eq!(grouped.len(), 2);
    let first = grouped.get("CH0001").expect("group for CH0001");
    assert_eq!(first.messages.len(), 2);
    assert_eq!(first.source, Source::ConversationsApi);
    let second = grouped.get("CH0002").expect("group for CH0002");
    assert_eq!(second.messages[0].author, "carol");
}

#[test]
fn media_becomes_attachments_preserving_order() {
    let mut message = raw("+2222", Some("+1111"), "with media");
    message.media = vec!["https://example.test/a".to_owned(), "https://example.test/b".to_owned()];
    let canonical = CanonicalMessage::from_raw(&message);
    assert_eq!(
        canonical.attachments,
        Some(vec![
            "https://example.test/a".to_owned(),
            "https://example.test/b".to_owned()
        ])
    );
}

#[test]
fn no_media_means_no_attachments_field_at_all() {
    let canonical = CanonicalMessage::from_raw(&raw("+2222", Some("+1111"), "plain"));
    assert_eq!(canonical.attachments, None);

    let value = serde_json::to_value(&canonical).expect("should serialize");
    let object = value.as_object().expect("canonical message is an object");
    assert!(!object.contains_key("attachments"));
    assert!(object.contains_key("dateSent"));
}

#[test]
fn sources_serialize_under_their_wire_names() {
    assert_eq!(
        serde_json::to_value(Source::MessagingApi).expect("should serialize"),
        json!("MessagingAPI")
    );
    assert_eq!(
        serde_json::to_value(Source::ConversationsApi).expect("should serialize"),
        json!("ConversationsAPI")
    );
}
