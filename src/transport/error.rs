//! Error types for the transport layer.

use thiserror::Error;

/// Errors a transport call can resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// `update_candidate` was given an id the backend does not know.
    #[error("candidate not found: {0}")]
    NotFound(String),

    /// `reorder_jobs` was given a position outside `1..=n`.
    #[error("no job at position {0}")]
    JobNotFound(u32),

    /// `update_job` or `save_assessment` was given a job id the backend does not know.
    #[error("job not found: {0}")]
    UnknownJob(String),

    /// The call was rejected by the configured failure policy.
    #[error("simulated failure in {operation}")]
    Injected { operation: &'static str },
}
