use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use tracing::{info, warn};

use super::model::Assessment;
use crate::error::{AssessmentError, PipelineError};
use crate::transport::AssessmentTransport;

/// Cached assessments, one per job, saved apply-after-confirm.
///
/// Every write validates the whole assessment first; the cache only ever holds
/// assessments the transport has stored.
pub struct AssessmentStore<T> {
    transport: T,
    assessments: RwLock<Vec<Assessment>>,
}

impl<T: AssessmentTransport> AssessmentStore<T> {
    pub fn new(transport: T, assessments: Vec<Assessment>) -> Self {
        Self {
            transport,
            assessments: RwLock::new(assessments),
        }
    }

    pub fn get(&self, job_id: &str) -> Option<Assessment> {
        self.read().iter().find(|a| a.job_id == job_id).cloned()
    }

    /// Load a job's assessment from the backend, caching it when present.
    pub async fn fetch(&self, job_id: &str) -> Result<Option<Assessment>, PipelineError> {
        let fetched = self.transport.get_assessment(job_id).await?;
        if let Some(assessment) = &fetched {
            self.upsert(assessment.clone());
        }
        Ok(fetched)
    }

    /// Save a first assessment for a job that has none.
    pub async fn create(&self, assessment: Assessment) -> Result<Assessment, PipelineError> {
        if self.get(&assessment.job_id).is_some() {
            return Err(PipelineError::AssessmentExists(assessment.job_id));
        }
        self.save(assessment).await
    }

    /// Apply `change` to a copy of the cached assessment and save the result.
    /// Nothing is stored when `change` or validation fails.
    pub async fn edit<F>(&self, job_id: &str, change: F) -> Result<Assessment, PipelineError>
    where
        F: FnOnce(&mut Assessment) -> Result<(), AssessmentError>,
    {
        let mut draft = self
            .get(job_id)
            .ok_or_else(|| PipelineError::AssessmentNotFound(job_id.to_string()))?;
        change(&mut draft)?;
        self.save(draft).await
    }

    pub async fn save(&self, assessment: Assessment) -> Result<Assessment, PipelineError> {
        assessment.validate()?;
        let confirmed = self
            .transport
            .save_assessment(&assessment)
            .await
            .inspect_err(|err| {
                warn!(job_id = %assessment.job_id, error = %err, "assessment rejected by transport");
            })?;

        self.upsert(confirmed.clone());
        info!(
            job_id = %confirmed.job_id,
            questions = confirmed.question_count(),
            "assessment saved"
        );
        Ok(confirmed)
    }

    pub fn snapshot(&self) -> Vec<Assessment> {
        self.read().clone()
    }

    fn upsert(&self, assessment: Assessment) {
        let mut assessments = self.assessments.write().unwrap_or_else(PoisonError::into_inner);
        match assessments.iter_mut().find(|a| a.job_id == assessment.job_id) {
            Some(slot) => *slot = assessment,
            None => assessments.push(assessment),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Assessment>> {
        self.assessments.read().unwrap_or_else(PoisonError::into_inner)
    }
}
