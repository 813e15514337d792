//! List naming and key sanitization tests.

use msgsync::pipeline::name::{list_name_for, strip_non_word, LIST_NAME_PREFIX};
use msgsync::pipeline::PipelineError;

fn identifiers(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_owned()).collect()
}

#[test]
fn customer_id_wins_over_identifiers() {
    let name = list_name_for(Some("jdoes1"), &identifiers(&["+14049401288"]))
        .expect("should derive a name");
    assert_eq!(name, "UnifiedMessagesList_jdoes1");
}

#[test]
fn empty_customer_id_falls_through_to_identifiers() {
    let name =
        list_name_for(Some(""), &identifiers(&["chatID00498"])).expect("should derive a name");
    assert_eq!(name, "UnifiedMessagesList_chatID00498");
}

#[test]
fn name_is_invariant_under_identifier_order() {
    let forward = list_name_for(None, &identifiers(&["+14049401288", "chatID00498"]))
        .expect("should derive a name");
    let reversed = list_name_for(None, &identifiers(&["chatID00498", "+14049401288"]))
        .expect("should derive a name");
    assert_eq!(forward, reversed);
    assert_eq!(forward, "UnifiedMessagesList_14049401288chatID00498");
}

#[test]
fn identifiers_sort_before_stripping() {
    // "+b" sorts ahead of "a" because '+' precedes every word character;
    // stripping first would flip the order.
    let name = list_name_for(None, &identifiers(&["a", "+b"])).expect("should derive a name");
    assert_eq!(name, "UnifiedMessagesList_ba");
}

#[test]
fn missing_customer_and_identifiers_is_invalid() {
    let result = list_name_for(None, &[]);
    assert!(matches!(result, Err(PipelineError::InvalidPayload)));
}

#[test]
fn empty_customer_id_with_no_identifiers_is_invalid() {
    let result = list_name_for(Some(""), &[]);
    assert!(matches!(result, Err(PipelineError::InvalidPayload)));
}

#[test]
fn strip_non_word_keeps_letters_digits_underscores() {
    assert_eq!(strip_non_word("+1 (404) 940-1288"), "14049401288");
    assert_eq!(strip_non_word("chat_ID.00498"), "chat_ID00498");
    assert_eq!(strip_non_word("___"), "___");
    assert_eq!(strip_non_word("+-()."), "");
}

#[test]
fn derived_names_share_the_prefix() {
    let name = list_name_for(Some("jdoes1"), &[]).expect("should derive a name");
    assert!(name.starts_with(LIST_NAME_PREFIX));
}
