//! Idempotent publish into the remote list store.
//!
//! Per run: ensure the service exists, delete any same-named list left
//! by a previous run, create a fresh one, then write every group as an
//! individual item. Item writes are best-effort; collection-level
//! operations are all-or-nothing.

use tracing::{debug, info, warn};

use crate::platform::{ApiError, ListStore, SyncList};

use super::group::{MessageGroup, UnifiedMapping};
use super::name::strip_non_word;

/// Outcome of one publish: what was written, and which items failed.
#[derive(Debug)]
pub struct PublishReport {
    /// The unique name the list was (re)created under.
    pub list_name: String,
    /// Items written successfully.
    pub written: usize,
    /// Per-item failures, in publish order.
    pub failures: Vec<ItemFailure>,
}

/// One item that could not be written.
#[derive(Debug)]
pub struct ItemFailure {
    /// The sanitized group key the item was keyed by.
    pub identifier: String,
    /// The write error.
    pub error: ApiError,
}

/// Fetch-or-create the backing service resource.
///
/// A `NotFound` fetch result triggers exactly one create call and no
/// further fetches; any other fetch failure is fatal.
///
/// # Errors
///
/// Propagates any non-`NotFound` fetch failure and any create failure.
pub async fn ensure_service_exists(
    store: &dyn ListStore,
    service_sid: &str,
) -> Result<(), ApiError> {
    match store.fetch_service(service_sid).await {
        Ok(_) => {
            debug!(service_sid, "sync service already exists");
            Ok(())
        }
        Err(ApiError::NotFound) => {
            info!(service_sid, "sync service does not exist, creating");
            store.create_service(service_sid).await?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Republish the unified mapping under `name`, replacing any previous
/// same-named list so the run always starts from an empty collection.
///
/// Per-item write failures are logged, collected into the report, and
/// never abort the loop.
///
/// # Errors
///
/// Propagates service, delete, and create failures; item failures are
/// reported, not returned.
pub async fn publish(
    store: &dyn ListStore,
    service_sid: &str,
    unified: &UnifiedMapping,
    name: &str,
) -> Result<PublishReport, ApiError> {
    ensure_service_exists(store, service_sid).await?;

    match store.fetch_list(service_sid, name).await {
        Ok(existing) => {
            info!(name, sid = %existing.sid, "sync list exists, deleting");
            store.delete_list(service_sid, &existing.sid).await?;
        }
        Err(ApiError::NotFound) => {}
        Err(e) => return Err(e),
    }

    info!(name, "creating sync list");
    let list = store.create_list(service_sid, name).await?;

    let mut written: usize = 0;
    let mut failures = Vec::new();
    for (key, group) in unified.iter() {
        let identifier = strip_non_word(key);
        match write_item(store, service_sid, &list, &identifier, group).await {
            Ok(()) => written = written.saturating_add(1),
            Err(error) => {
                warn!(identifier = %identifier, error = %error, "failed to write list item");
                failures.push(ItemFailure { identifier, error });
            }
        }
    }

    Ok(PublishReport {
        list_name: name.to_owned(),
        written,
        failures,
    })
}

async fn write_item(
    store: &dyn ListStore,
    service_sid: &str,
    list: &SyncList,
    identifier: &str,
    group: &MessageGroup,
) -> Result<(), ApiError> {
    let data = serde_json::json!({
        "identifier": identifier,
        "messages": group.messages,
        "source": group.source,
    });
    store.create_item(service_sid, &list.sid, data).await
}
