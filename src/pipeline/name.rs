//! Deterministic list naming and key sanitization.

use std::sync::LazyLock;

use regex::Regex;

use super::PipelineError;

/// Prefix shared by every published list name.
pub const LIST_NAME_PREFIX: &str = "UnifiedMessagesList_";

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W").expect("literal pattern compiles"));

/// Strip every non-word character (`[^0-9A-Za-z_]`) from the input.
pub fn strip_non_word(input: &str) -> String {
    NON_WORD.replace_all(input, "").into_owned()
}

/// Derive the list name for a run.
///
/// A non-empty customer id wins outright. Otherwise the identifiers are
/// sorted, concatenated, and stripped of non-word characters — sort
/// before strip, so the name is a pure function of the identifier set
/// rather than of submission order or formatting.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidPayload`] when neither a customer id
/// nor a non-empty identifier set is usable.
pub fn list_name_for(
    customer_id: Option<&str>,
    identifiers: &[String],
) -> Result<String, PipelineError> {
    if let Some(customer_id) = customer_id {
        if !customer_id.is_empty() {
            return Ok(format!("{LIST_NAME_PREFIX}{customer_id}"));
        }
    }
    if identifiers.is_empty() {
        return Err(PipelineError::InvalidPayload);
    }
    let mut sorted = identifiers.to_vec();
    sorted.sort();
    Ok(format!(
        "{LIST_NAME_PREFIX}{}",
        strip_non_word(&sorted.concat())
    ))
}
