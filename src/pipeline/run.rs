//! Orchestration of one aggregation run.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::platform::{ListStore, MessagePlatform};

use super::group::UnifiedMapping;
use super::name::list_name_for;
use super::normalize::{
    fetch_conversations, fetch_direct_messages, normalize_conversations, normalize_direct,
};
use super::publish::{publish, PublishReport};
use super::PipelineError;

/// Marker character identifying an address-shaped identifier.
const ADDRESS_MARKER: char = '+';

/// The logical inputs of one run.
#[derive(Debug, Clone, Default)]
pub struct RunPayload {
    /// Customer id the published list is named after, when present.
    pub customer_id: Option<String>,
    /// Addresses and opaque conversation-capable identifiers to aggregate.
    pub identifiers: Vec<String>,
}

/// Drives the per-identifier fetch→normalize→merge loop and publishes
/// the accumulated mapping exactly once at the end.
///
/// All collaborator handles and the target service SID are explicit
/// construction-time configuration; the runner keeps no other state.
pub struct Runner {
    platform: Arc<dyn MessagePlatform>,
    store: Arc<dyn ListStore>,
    sync_service_sid: String,
}

impl Runner {
    /// Create a runner over the given collaborators.
    pub fn new(
        platform: Arc<dyn MessagePlatform>,
        store: Arc<dyn ListStore>,
        sync_service_sid: String,
    ) -> Self {
        Self {
            platform,
            store,
            sync_service_sid,
        }
    }

    /// Aggregate every identifier in the payload and publish the result.
    ///
    /// Address-shaped identifiers go through the direct-message path
    /// first; every identifier, regardless of shape, is then checked for
    /// conversation participation. Upstream calls are strictly
    /// sequential.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPayload`] before any network
    /// activity when the payload is unusable, and propagates any fatal
    /// collaborator failure. Item-level write failures surface only in
    /// the report.
    pub async fn run(&self, payload: &RunPayload) -> Result<PublishReport, PipelineError> {
        let started = Instant::now();
        let name = list_name_for(payload.customer_id.as_deref(), &payload.identifiers)?;

        let mut unified = UnifiedMapping::default();
        for identifier in &payload.identifiers {
            if identifier.starts_with(ADDRESS_MARKER) {
                let fetched = fetch_direct_messages(self.platform.as_ref(), identifier).await?;
                unified.absorb(normalize_direct(&fetched, identifier));
            }
            let conversations = fetch_conversations(self.platform.as_ref(), identifier).await?;
            unified.absorb(normalize_conversations(&conversations));
        }

        let report = publish(
            self.store.as_ref(),
            &self.sync_service_sid,
            &unified,
            &name,
        )
        .await?;

        info!(
            list_name = %report.list_name,
            groups = unified.len(),
            written = report.written,
            failed = report.failures.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "run complete"
        );
        Ok(report)
    }
}
