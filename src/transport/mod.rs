//! The request/response boundary standing in for a real backend.
//!
//! Stores talk to the backend only through [`CandidateTransport`],
//! [`JobTransport`] and [`AssessmentTransport`]; [`MockTransport`] implements
//! all three over an in-memory dataset with configurable latency and failure
//! injection.

pub mod error;
pub mod mock;
pub mod types;

use std::sync::Arc;

use crate::assessments::Assessment;
use crate::jobs::{Job, JobDraft, JobPatch};
use crate::pipeline::{Candidate, CandidatePatch};

pub use error::TransportError;
pub use mock::{FailurePolicy, MockTransport, MockTransportConfig};
pub use types::{CandidatePage, CandidateQuery, JobPage, JobQuery};

/// Candidate endpoints consumed by the pipeline store.
pub trait CandidateTransport {
    /// Fetch one page of candidates after server-side filtering.
    async fn get_candidates(&self, query: &CandidateQuery)
    -> Result<CandidatePage, TransportError>;

    /// Apply a partial update and return the confirmed record.
    async fn update_candidate(
        &self,
        id: &str,
        patch: &CandidatePatch,
    ) -> Result<Candidate, TransportError>;
}

/// Job endpoints consumed by the job board.
pub trait JobTransport {
    async fn get_jobs(&self, query: &JobQuery) -> Result<JobPage, TransportError>;

    /// Move the job at position `from_order` to `to_order` and return every job
    /// with its renumbered `order`.
    async fn reorder_jobs(&self, from_order: u32, to_order: u32)
    -> Result<Vec<Job>, TransportError>;

    /// Store a validated draft and return the job with its assigned id and order.
    async fn create_job(&self, draft: &JobDraft) -> Result<Job, TransportError>;

    /// Apply a partial update and return the confirmed job.
    async fn update_job(&self, id: &str, patch: &JobPatch) -> Result<Job, TransportError>;
}

/// Assessment endpoints consumed by the assessment store.
pub trait AssessmentTransport {
    /// `Ok(None)` when the job has no assessment yet.
    async fn get_assessment(&self, job_id: &str) -> Result<Option<Assessment>, TransportError>;

    /// Replace the job's assessment and return the stored copy.
    async fn save_assessment(&self, assessment: &Assessment)
    -> Result<Assessment, TransportError>;
}

impl<T: CandidateTransport> CandidateTransport for Arc<T> {
    async fn get_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<CandidatePage, TransportError> {
        (**self).get_candidates(query).await
    }

    async fn update_candidate(
        &self,
        id: &str,
        patch: &CandidatePatch,
    ) -> Result<Candidate, TransportError> {
        (**self).update_candidate(id, patch).await
    }
}

impl<T: JobTransport> JobTransport for Arc<T> {
    async fn get_jobs(&self, query: &JobQuery) -> Result<JobPage, TransportError> {
        (**self).get_jobs(query).await
    }

    async fn reorder_jobs(
        &self,
        from_order: u32,
        to_order: u32,
    ) -> Result<Vec<Job>, TransportError> {
        (**self).reorder_jobs(from_order, to_order).await
    }

    async fn create_job(&self, draft: &JobDraft) -> Result<Job, TransportError> {
        (**self).create_job(draft).await
    }

    async fn update_job(&self, id: &str, patch: &JobPatch) -> Result<Job, TransportError> {
        (**self).update_job(id, patch).await
    }
}

impl<T: AssessmentTransport> AssessmentTransport for Arc<T> {
    async fn get_assessment(&self, job_id: &str) -> Result<Option<Assessment>, TransportError> {
        (**self).get_assessment(job_id).await
    }

    async fn save_assessment(
        &self,
        assessment: &Assessment,
    ) -> Result<Assessment, TransportError> {
        (**self).save_assessment(assessment).await
    }
}
