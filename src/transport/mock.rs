use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use chrono::Utc;
use rand::{Rng, SeedableRng};
use tokio::time::sleep;
use tracing::debug;

use super::error::TransportError;
use super::types::{CandidatePage, CandidateQuery, JobPage, JobQuery};
use super::{AssessmentTransport, CandidateTransport, JobTransport};
use crate::assessments::Assessment;
use crate::dataset::Dataset;
use crate::jobs::{self, Job, JobDraft, JobPatch};
use crate::pipeline::{Candidate, CandidatePatch, filter_candidates};

/// Default artificial latency applied to every call.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(300);

/// When a transport operation should be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FailurePolicy {
    #[default]
    Never,
    Always,
    /// Fail with the given probability, drawn from the transport's seeded RNG.
    Rate(f64),
}

impl FailurePolicy {
    /// Map a probability to a policy: `<= 0` never fails, `>= 1` always fails.
    pub fn from_rate(rate: f64) -> Self {
        if rate.is_nan() || rate <= 0.0 {
            FailurePolicy::Never
        } else if rate >= 1.0 {
            FailurePolicy::Always
        } else {
            FailurePolicy::Rate(rate)
        }
    }

    fn trips(&self, rng: &mut StdRng) -> bool {
        match self {
            FailurePolicy::Never => false,
            FailurePolicy::Always => true,
            FailurePolicy::Rate(p) => rng.r#gen::<f64>() < *p,
        }
    }
}

/// Knobs for [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockTransportConfig {
    /// Delay applied before every call resolves. Zero disables it.
    pub latency: Duration,
    pub read_failures: FailurePolicy,
    /// Candidate updates and every job or assessment write except reorders.
    pub update_failures: FailurePolicy,
    pub reorder_failures: FailurePolicy,
    /// Seed for `FailurePolicy::Rate` draws.
    pub seed: u64,
}

impl Default for MockTransportConfig {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            read_failures: FailurePolicy::Never,
            update_failures: FailurePolicy::Never,
            reorder_failures: FailurePolicy::Never,
            seed: 0,
        }
    }
}

impl MockTransportConfig {
    /// No latency and no failures.
    #[cfg(test)]
    pub fn instant() -> Self {
        Self {
            latency: Duration::ZERO,
            ..Default::default()
        }
    }
}

/// In-memory backend with artificial latency and explicit failure injection.
///
/// Holds its own copy of the dataset: stores only observe a change after the
/// transport has confirmed it.
pub struct MockTransport {
    config: MockTransportConfig,
    candidates: Mutex<Vec<Candidate>>,
    jobs: Mutex<Vec<Job>>,
    assessments: Mutex<Vec<Assessment>>,
    rng: Mutex<StdRng>,
}

impl MockTransport {
    pub fn new(dataset: Dataset, config: MockTransportConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            candidates: Mutex::new(dataset.candidates),
            jobs: Mutex::new(dataset.jobs),
            assessments: Mutex::new(dataset.assessments),
            rng: Mutex::new(rng),
        }
    }

    /// The backend's current copy of a candidate.
    #[cfg(test)]
    pub fn candidate(&self, id: &str) -> Option<Candidate> {
        lock(&self.candidates).iter().find(|c| c.id == id).cloned()
    }

    /// The backend's current jobs, in storage order.
    #[cfg(test)]
    pub fn jobs(&self) -> Vec<Job> {
        lock(&self.jobs).clone()
    }

    async fn simulate_latency(&self) {
        if !self.config.latency.is_zero() {
            sleep(self.config.latency).await;
        }
    }

    fn check(&self, policy: FailurePolicy, operation: &'static str) -> Result<(), TransportError> {
        if policy.trips(&mut lock(&self.rng)) {
            debug!(operation, "injected transport failure");
            return Err(TransportError::Injected { operation });
        }
        Ok(())
    }
}

impl CandidateTransport for MockTransport {
    async fn get_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<CandidatePage, TransportError> {
        self.simulate_latency().await;
        self.check(self.config.read_failures, "get_candidates")?;

        let filtered = filter_candidates(lock(&self.candidates).iter(), &query.filter());
        let page = CandidatePage::from_filtered(filtered, query);
        debug!(
            search = %query.search,
            page = page.page,
            returned = page.candidates.len(),
            total = page.total,
            "get_candidates"
        );
        Ok(page)
    }

    async fn update_candidate(
        &self,
        id: &str,
        patch: &CandidatePatch,
    ) -> Result<Candidate, TransportError> {
        self.simulate_latency().await;
        self.check(self.config.update_failures, "update_candidate")?;

        let mut candidates = lock(&self.candidates);
        let candidate = candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| TransportError::NotFound(id.to_string()))?;
        candidate.apply(patch);
        debug!(id, stage = %candidate.stage, "update_candidate");
        Ok(candidate.clone())
    }
}

impl JobTransport for MockTransport {
    async fn get_jobs(&self, query: &JobQuery) -> Result<JobPage, TransportError> {
        self.simulate_latency().await;
        self.check(self.config.read_failures, "get_jobs")?;

        let page = jobs::query_jobs(lock(&self.jobs).iter(), query);
        debug!(search = %query.search, total = page.total, "get_jobs");
        Ok(page)
    }

    async fn reorder_jobs(
        &self,
        from_order: u32,
        to_order: u32,
    ) -> Result<Vec<Job>, TransportError> {
        self.simulate_latency().await;
        self.check(self.config.reorder_failures, "reorder_jobs")?;

        let mut jobs = lock(&self.jobs);
        jobs::reorder(&mut jobs, from_order, to_order).map_err(TransportError::JobNotFound)?;
        debug!(from_order, to_order, "reorder_jobs");
        Ok(jobs.clone())
    }

    async fn create_job(&self, draft: &JobDraft) -> Result<Job, TransportError> {
        self.simulate_latency().await;
        self.check(self.config.update_failures, "create_job")?;

        let mut jobs = lock(&self.jobs);
        let next_id = jobs
            .iter()
            .filter_map(|j| j.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let order = jobs.len() as u32 + 1;
        let job = draft.clone().into_job(next_id.to_string(), order, Utc::now());
        jobs.push(job.clone());
        debug!(id = %job.id, slug = %job.slug, "create_job");
        Ok(job)
    }

    async fn update_job(&self, id: &str, patch: &JobPatch) -> Result<Job, TransportError> {
        self.simulate_latency().await;
        self.check(self.config.update_failures, "update_job")?;

        let mut jobs = lock(&self.jobs);
        let job = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| TransportError::UnknownJob(id.to_string()))?;
        job.apply(patch);
        debug!(id, status = ?job.status, "update_job");
        Ok(job.clone())
    }
}

impl AssessmentTransport for MockTransport {
    async fn get_assessment(&self, job_id: &str) -> Result<Option<Assessment>, TransportError> {
        self.simulate_latency().await;
        self.check(self.config.read_failures, "get_assessment")?;

        let found = lock(&self.assessments)
            .iter()
            .find(|a| a.job_id == job_id)
            .cloned();
        debug!(job_id, found = found.is_some(), "get_assessment");
        Ok(found)
    }

    async fn save_assessment(
        &self,
        assessment: &Assessment,
    ) -> Result<Assessment, TransportError> {
        self.simulate_latency().await;
        self.check(self.config.update_failures, "save_assessment")?;

        if !lock(&self.jobs).iter().any(|j| j.id == assessment.job_id) {
            return Err(TransportError::UnknownJob(assessment.job_id.clone()));
        }
        let mut assessments = lock(&self.assessments);
        match assessments.iter_mut().find(|a| a.job_id == assessment.job_id) {
            Some(slot) => *slot = assessment.clone(),
            None => assessments.push(assessment.clone()),
        }
        debug!(job_id = %assessment.job_id, "save_assessment");
        Ok(assessment.clone())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobStatus;
    use crate::pipeline::Stage;

    fn dataset() -> Dataset {
        Dataset {
            jobs: crate::dataset::seed_jobs(),
            candidates: vec![
                Candidate::new("1", "Jane Smith", "jane.smith@example.com", "1"),
                Candidate::new("2", "John Brown", "john.brown@example.com", "2")
                    .with_stage(Stage::Tech),
                Candidate::new("3", "Sarah Jones", "sarah.jones@example.com", "1")
                    .with_stage(Stage::Tech),
            ],
            assessments: crate::dataset::seed_assessments(),
        }
    }

    fn transport(config: MockTransportConfig) -> MockTransport {
        MockTransport::new(dataset(), config)
    }

    #[test]
    fn failure_policy_from_rate() {
        assert_eq!(FailurePolicy::from_rate(0.0), FailurePolicy::Never);
        assert_eq!(FailurePolicy::from_rate(-1.0), FailurePolicy::Never);
        assert_eq!(FailurePolicy::from_rate(f64::NAN), FailurePolicy::Never);
        assert_eq!(FailurePolicy::from_rate(1.0), FailurePolicy::Always);
        assert_eq!(FailurePolicy::from_rate(0.1), FailurePolicy::Rate(0.1));
    }

    #[test]
    fn rate_policy_is_reproducible_for_a_seed() {
        let draws = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..50)
                .map(|_| FailurePolicy::Rate(0.3).trips(&mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(draws(7), draws(7));
        assert!(draws(7).iter().any(|tripped| *tripped));
        assert!(draws(7).iter().any(|tripped| !*tripped));
    }

    #[test]
    fn default_latency_is_300ms() {
        assert_eq!(MockTransportConfig::default().latency, Duration::from_millis(300));
        assert!(MockTransportConfig::instant().latency.is_zero());
    }

    #[tokio::test]
    async fn get_candidates_filters_server_side() {
        let t = transport(MockTransportConfig::instant());
        let query = CandidateQuery {
            stage: Some(Stage::Tech),
            ..Default::default()
        };
        let page = t.get_candidates(&query).await.unwrap();
        let ids: Vec<_> = page.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(page.total, 2);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn update_candidate_applies_patch() {
        let t = transport(MockTransportConfig::instant());
        let updated = t
            .update_candidate("2", &CandidatePatch::stage(Stage::Offer))
            .await
            .unwrap();
        assert_eq!(updated.stage, Stage::Offer);
        assert_eq!(t.candidate("2").unwrap().stage, Stage::Offer);
    }

    #[tokio::test]
    async fn update_unknown_candidate_is_not_found() {
        let t = transport(MockTransportConfig::instant());
        let err = t
            .update_candidate("999", &CandidatePatch::stage(Stage::Offer))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::NotFound("999".into()));
    }

    #[tokio::test]
    async fn injected_update_failure_changes_nothing() {
        let t = transport(MockTransportConfig {
            update_failures: FailurePolicy::Always,
            ..MockTransportConfig::instant()
        });
        let err = t
            .update_candidate("2", &CandidatePatch::stage(Stage::Offer))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Injected { operation: "update_candidate" }));
        assert_eq!(t.candidate("2").unwrap().stage, Stage::Tech);
    }

    #[tokio::test]
    async fn injected_read_failure() {
        let t = transport(MockTransportConfig {
            read_failures: FailurePolicy::Always,
            ..MockTransportConfig::instant()
        });
        assert!(t.get_candidates(&CandidateQuery::default()).await.is_err());
        assert!(t.get_jobs(&JobQuery::default()).await.is_err());
    }

    #[tokio::test]
    async fn reorder_jobs_renumbers() {
        let t = transport(MockTransportConfig::instant());
        let jobs = t.reorder_jobs(1, 3).await.unwrap();
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1", "4", "5"]);
        let orders: Vec<_> = jobs.iter().map(|j| j.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn reorder_failure_keeps_order() {
        let t = transport(MockTransportConfig {
            reorder_failures: FailurePolicy::Always,
            ..MockTransportConfig::instant()
        });
        let before = t.jobs();
        assert!(t.reorder_jobs(1, 3).await.is_err());
        assert_eq!(t.jobs(), before);
    }

    #[tokio::test]
    async fn reorder_unknown_position_is_rejected() {
        let t = transport(MockTransportConfig::instant());
        let err = t.reorder_jobs(1, 9).await.unwrap_err();
        assert_eq!(err, TransportError::JobNotFound(9));
    }

    #[tokio::test]
    async fn create_job_assigns_next_id_and_order() {
        let t = transport(MockTransportConfig::instant());
        let draft = JobDraft {
            title: "Data Engineer".into(),
            description: "Pipelines".into(),
            requirements: vec!["SQL".into()],
            ..Default::default()
        }
        .normalize()
        .unwrap();

        let job = t.create_job(&draft).await.unwrap();
        assert_eq!(job.id, "6");
        assert_eq!(job.order, 6);
        assert_eq!(job.slug, "data-engineer");
        assert_eq!(t.jobs().last(), Some(&job));
    }

    #[tokio::test]
    async fn update_job_applies_patch() {
        let t = transport(MockTransportConfig::instant());
        let job = t
            .update_job("4", &JobPatch::status(JobStatus::Active))
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Active);
        assert_eq!(t.jobs()[3].status, JobStatus::Active);

        let err = t
            .update_job("99", &JobPatch::status(JobStatus::Active))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::UnknownJob("99".into()));
    }

    #[tokio::test]
    async fn injected_job_write_failure_changes_nothing() {
        let t = transport(MockTransportConfig {
            update_failures: FailurePolicy::Always,
            ..MockTransportConfig::instant()
        });
        let before = t.jobs();
        let err = t
            .update_job("1", &JobPatch::status(JobStatus::Archived))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Injected { operation: "update_job" }));
        assert_eq!(t.jobs(), before);
    }

    #[tokio::test]
    async fn assessments_round_trip_through_backend() {
        let t = transport(MockTransportConfig::instant());
        assert!(t.get_assessment("2").await.unwrap().is_none());

        let mut saved = t.get_assessment("1").await.unwrap().unwrap();
        saved.set_title("Frontend screening");
        t.save_assessment(&saved).await.unwrap();
        assert_eq!(t.get_assessment("1").await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn save_assessment_needs_a_known_job() {
        let t = transport(MockTransportConfig::instant());
        let orphan = Assessment::new("77");
        let err = t.save_assessment(&orphan).await.unwrap_err();
        assert_eq!(err, TransportError::UnknownJob("77".into()));
        assert!(t.get_assessment("77").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn calls_wait_for_configured_latency() {
        let t = transport(MockTransportConfig {
            latency: Duration::from_millis(300),
            ..Default::default()
        });
        let started = tokio::time::Instant::now();
        t.get_candidates(&CandidateQuery::default()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
