//! Messaging and Conversations API wire format tests.

use chrono::{TimeZone, Utc};
use serde_json::json;
use url::Url;

use msgsync::platform::twilio::{
    media_url, parse_conversation_messages_page, parse_media_page, parse_message_page,
    parse_participant_conversations_page,
};
use msgsync::platform::ApiError;

#[test]
fn message_page_parses_rfc2822_dates() {
    let body = json!({
        "messages": [{
            "sid": "SM0001",
            "from": "+14049401288",
            "to": "+14043338820",
            "body": "hello",
            "date_created": "Fri, 24 May 2019 17:44:46 +0000",
            "num_media": "0",
            "subresource_uris": {
                "media": "/2010-04-01/Accounts/AC1/Messages/SM0001/Media.json"
            }
        }],
        "next_page_uri": "/2010-04-01/Accounts/AC1/Messages.json?Page=1"
    });
    let page = parse_message_page(&body.to_string()).expect("should parse");

    assert_eq!(page.messages.len(), 1);
    let message = &page.messages[0];
    assert_eq!(message.from, "+14049401288");
    assert_eq!(message.to, "+14043338820");
    assert_eq!(message.body.as_deref(), Some("hello"));
    assert_eq!(
        message.date_created,
        Utc.with_ymd_and_hms(2019, 5, 24, 17, 44, 46)
            .single()
            .expect("valid timestamp")
    );
    assert!(page.next_page_uri.is_some());
}

#[test]
fn message_page_tolerates_null_body() {
    let body = json!({
        "messages": [{
            "sid": "SM0002",
            "from": "+14049401288",
            "to": "+14043338820",
            "body": null,
            "date_created": "Fri, 24 May 2019 17:44:46 +0000",
            "num_media": "1",
            "subresource_uris": null
        }],
        "next_page_uri": null
    });
    let page = parse_message_page(&body.to_string()).expect("should parse");
    assert_eq!(page.messages[0].body, None);
    assert_eq!(page.messages[0].num_media.as_deref(), Some("1"));
}

#[test]
fn message_page_rejects_malformed_bodies() {
    assert!(matches!(
        parse_message_page("not json"),
        Err(ApiError::Parse(_))
    ));
}

#[test]
fn message_page_rejects_iso_dates() {
    // The Messaging API speaks RFC 2822 only.
    let body = json!({
        "messages": [{
            "sid": "SM0003",
            "from": "+1",
            "to": "+2",
            "body": "x",
            "date_created": "2019-05-24T17:44:46Z",
            "num_media": "0",
            "subresource_uris": null
        }],
        "next_page_uri": null
    });
    assert!(matches!(
        parse_message_page(&body.to_string()),
        Err(ApiError::Parse(_))
    ));
}

#[test]
fn media_page_parses_entries_in_order() {
    let body = json!({
        "media_list": [
            {"uri": "/2010-04-01/Accounts/AC1/Messages/SM1/Media/ME1.json"},
            {"uri": "/2010-04-01/Accounts/AC1/Messages/SM1/Media/ME2.json"}
        ]
    });
    let page = parse_media_page(&body.to_string()).expect("should parse");
    assert_eq!(page.media_list.len(), 2);
    assert!(page.media_list[0].uri.ends_with("ME1.json"));
}

#[test]
fn media_url_strips_the_document_suffix() {
    let base = Url::parse("https://api.twilio.com/").expect("valid base");
    let resolved = media_url(
        &base,
        "/2010-04-01/Accounts/AC1/Messages/SM1/Media/ME1.json",
    );
    assert_eq!(
        resolved,
        "https://api.twilio.com/2010-04-01/Accounts/AC1/Messages/SM1/Media/ME1"
    );
}

#[test]
fn participant_conversations_page_parses_pagination() {
    let body = json!({
        "conversations": [{
            "conversation_sid": "CH0001",
            "conversation_date_updated": "2024-03-01T12:00:00Z",
            "conversation_date_created": "2024-02-01T12:00:00Z"
        }],
        "meta": {"next_page_url": "https://conversations.twilio.com/v1/ParticipantConversations?Page=1"}
    });
    let page = parse_participant_conversations_page(&body.to_string()).expect("should parse");
    assert_eq!(page.conversations[0].conversation_sid, "CH0001");
    assert!(page.meta.next_page_url.is_some());
}

#[test]
fn participant_conversations_page_defaults_missing_meta() {
    let body = json!({"conversations": []});
    let page = parse_participant_conversations_page(&body.to_string()).expect("should parse");
    assert!(page.conversations.is_empty());
    assert_eq!(page.meta.next_page_url, None);
}

#[test]
fn conversation_messages_tolerate_null_authors() {
    let body = json!({
        "messages": [{
            "author": null,
            "body": "system notice",
            "date_created": "2024-03-01T12:00:00Z"
        }],
        "meta": {"next_page_url": null}
    });
    let page = parse_conversation_messages_page(&body.to_string()).expect("should parse");
    assert_eq!(page.messages[0].author, None);
    assert_eq!(page.messages[0].body.as_deref(), Some("system notice"));
}
