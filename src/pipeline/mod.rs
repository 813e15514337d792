//! The normalization and idempotent-publish pipeline.
//!
//! Data flows strictly forward: source adapters ([`normalize`]) →
//! canonical grouping ([`group`]) → accumulation across identifiers →
//! idempotent publish ([`publish`]). The [`run::Runner`] drives the whole
//! sequence for one payload.
//!
//! Raw platform shapes stop at the normalizer; everything downstream
//! sees only [`group::CanonicalMessage`] and [`group::MessageGroup`].

use crate::platform::ApiError;

pub mod group;
pub mod name;
pub mod normalize;
pub mod publish;
pub mod run;

/// Errors raised by the pipeline itself.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Neither a customer id nor a non-empty identifier set was supplied.
    #[error("payload must include a customer id or at least one identifier")]
    InvalidPayload,

    /// A collaborator call failed.
    #[error("upstream call failed: {0}")]
    Upstream(#[from] ApiError),
}
