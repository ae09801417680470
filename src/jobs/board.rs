use std::sync::{PoisonError, RwLock};

use tracing::{info, warn};

use super::job::{Job, JobDraft, JobPatch, query_jobs};
use crate::error::PipelineError;
use crate::transport::{JobPage, JobQuery, JobTransport};

/// Cached job list. Creates, edits and reorders are applied after the backend
/// confirms them.
pub struct JobBoard<T> {
    transport: T,
    jobs: RwLock<Vec<Job>>,
}

impl<T: JobTransport> JobBoard<T> {
    pub fn new(transport: T, jobs: Vec<Job>) -> Self {
        Self {
            transport,
            jobs: RwLock::new(jobs),
        }
    }

    /// Filter, sort and paginate the cached jobs.
    pub fn list_jobs(&self, query: &JobQuery) -> JobPage {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        query_jobs(jobs.iter(), query)
    }

    pub fn get_job(&self, id: &str) -> Result<Job, PipelineError> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.iter()
            .find(|job| job.id == id)
            .cloned()
            .ok_or_else(|| PipelineError::UnknownJob(id.to_string()))
    }

    /// Fetch a page from the backend without touching the cache.
    pub async fn fetch_jobs(&self, query: &JobQuery) -> Result<JobPage, PipelineError> {
        Ok(self.transport.get_jobs(query).await?)
    }

    /// Move the job at `from_order` to `to_order`.
    ///
    /// The cache is replaced with the backend's renumbered list only once the
    /// backend confirms; a failed call leaves the cached order as it was.
    pub async fn reorder(&self, from_order: u32, to_order: u32) -> Result<Vec<Job>, PipelineError> {
        let len = self.snapshot().len();
        for order in [from_order, to_order] {
            if order == 0 || order as usize > len {
                return Err(PipelineError::JobNotFound(order));
            }
        }

        let confirmed = self
            .transport
            .reorder_jobs(from_order, to_order)
            .await
            .inspect_err(|err| warn!(from_order, to_order, error = %err, "reorder rejected by transport"))?;

        *self.jobs.write().unwrap_or_else(PoisonError::into_inner) = confirmed.clone();
        info!(from_order, to_order, "jobs reordered");
        Ok(confirmed)
    }

    /// Validate `draft`, have the backend store it, then add the confirmed job
    /// to the cache.
    pub async fn create_job(&self, draft: JobDraft) -> Result<Job, PipelineError> {
        let draft = draft.normalize()?;
        let job = self
            .transport
            .create_job(&draft)
            .await
            .inspect_err(|err| warn!(title = %draft.title, error = %err, "create rejected by transport"))?;

        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(job.clone());
        info!(id = %job.id, slug = %job.slug, "job created");
        Ok(job)
    }

    /// Apply `patch` to a copy of the cached job and check the result before
    /// sending the patch.
    pub async fn update_job(&self, id: &str, patch: &JobPatch) -> Result<Job, PipelineError> {
        let mut preview = self.get_job(id)?;
        preview.apply(patch);
        preview.validate()?;

        let confirmed = self
            .transport
            .update_job(id, patch)
            .await
            .inspect_err(|err| warn!(id, error = %err, "job update rejected by transport"))?;
        self.commit(confirmed.clone());
        info!(id, status = %confirmed.status, "job updated");
        Ok(confirmed)
    }

    /// Flip a job between active and archived.
    pub async fn toggle_archive(&self, id: &str) -> Result<Job, PipelineError> {
        let status = self.get_job(id)?.status.toggled();
        self.update_job(id, &JobPatch::status(status)).await
    }

    /// Copy of every cached job, sorted by board position.
    pub fn snapshot(&self) -> Vec<Job> {
        let mut jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner).clone();
        jobs.sort_by_key(|job| job.order);
        jobs
    }

    fn commit(&self, job: Job) {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        match jobs.iter_mut().find(|cached| cached.id == job.id) {
            Some(slot) => *slot = job,
            None => jobs.push(job),
        }
    }
}
