use std::collections::HashSet;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use super::candidate::{Candidate, CandidatePatch, Note};
use super::filter::{CandidateFilter, filter_candidates};
use super::stage::{Stage, StageMachine, Transition};
use crate::error::PipelineError;
use crate::transport::{CandidatePage, CandidateQuery, CandidateTransport};

/// Authoritative candidate collection and the only path that changes a stage.
///
/// Mutations follow apply-after-confirm: the store validates against its cache,
/// sends a patch to the transport, and replaces the cached record only with the
/// record the transport confirmed. A failed transport call leaves the cache
/// exactly as it was.
///
/// Only one mutation per candidate may be awaiting the transport at a time;
/// a second one fails with [`PipelineError::MutationInFlight`]. Reads never
/// wait on the transport.
pub struct PipelineStore<T> {
    transport: T,
    candidates: RwLock<Vec<Candidate>>,
    in_flight: Mutex<HashSet<String>>,
}

impl<T: CandidateTransport> PipelineStore<T> {
    pub fn new(transport: T, candidates: Vec<Candidate>) -> Self {
        Self {
            transport,
            candidates: RwLock::new(candidates),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Candidates matching `filter`, in cache order.
    pub fn list_candidates(&self, filter: &CandidateFilter) -> Vec<Candidate> {
        filter_candidates(self.read().iter(), filter)
    }

    pub fn get_candidate(&self, id: &str) -> Result<Candidate, PipelineError> {
        self.read()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| PipelineError::NotFound(id.to_string()))
    }

    /// Candidates grouped per stage, one entry for every stage in board order.
    pub fn board(&self) -> Vec<(Stage, Vec<Candidate>)> {
        let candidates = self.read();
        Stage::ALL
            .into_iter()
            .map(|stage| {
                let column = candidates
                    .iter()
                    .filter(|c| c.stage == stage)
                    .cloned()
                    .collect();
                (stage, column)
            })
            .collect()
    }

    /// Copy of every cached candidate.
    pub fn snapshot(&self) -> Vec<Candidate> {
        self.read().clone()
    }

    /// Fetch a page from the transport and merge it into the cache.
    ///
    /// Records with a known id replace the cached copy; unknown ones are
    /// appended. A transport failure leaves the cache unchanged.
    pub async fn refresh(&self, query: &CandidateQuery) -> Result<CandidatePage, PipelineError> {
        let page = self
            .transport
            .get_candidates(query)
            .await
            .inspect_err(|err| warn!(error = %err, "candidate refresh failed"))?;

        let mut candidates = self.write();
        for fetched in &page.candidates {
            match candidates.iter_mut().find(|c| c.id == fetched.id) {
                Some(slot) => *slot = fetched.clone(),
                None => candidates.push(fetched.clone()),
            }
        }
        Ok(page)
    }

    /// Move a candidate one step forward along [`Stage::FORWARD`].
    ///
    /// Fails with `TerminalStage` from `Hired` or `Rejected`.
    pub async fn advance_stage(&self, id: &str) -> Result<Candidate, PipelineError> {
        let _guard = self.begin_mutation(id)?;
        let current = self.get_candidate(id)?;

        let next = match StageMachine::next(current.stage) {
            Transition::Next(next) => next,
            Transition::Terminal(stage) => {
                warn!(id, %stage, "advance refused: terminal stage");
                return Err(PipelineError::TerminalStage {
                    id: id.to_string(),
                    stage,
                });
            }
        };

        let confirmed = self.commit(id, CandidatePatch::stage(next)).await?;
        info!(id, from = %current.stage, to = %confirmed.stage, "candidate advanced");
        Ok(confirmed)
    }

    /// Unconditional override to any stage, including out of a terminal one.
    pub async fn set_stage(&self, id: &str, target: Stage) -> Result<Candidate, PipelineError> {
        let _guard = self.begin_mutation(id)?;
        let current = self.get_candidate(id)?;

        let confirmed = self.commit(id, CandidatePatch::stage(target)).await?;
        info!(id, from = %current.stage, to = %confirmed.stage, "candidate stage set");
        Ok(confirmed)
    }

    /// [`set_stage`](Self::set_stage) for a stage given by name.
    ///
    /// An unknown id is reported before an unparseable stage.
    pub async fn set_stage_named(&self, id: &str, target: &str) -> Result<Candidate, PipelineError> {
        self.get_candidate(id)?;
        let stage = target.parse::<Stage>()?;
        self.set_stage(id, stage).await
    }

    /// Prepend a note. Blank content fails with `EmptyNote`.
    pub async fn append_note(
        &self,
        id: &str,
        content: &str,
        author: &str,
    ) -> Result<Candidate, PipelineError> {
        if content.trim().is_empty() {
            return Err(PipelineError::EmptyNote);
        }
        let _guard = self.begin_mutation(id)?;
        let current = self.get_candidate(id)?;

        let mut notes = Vec::with_capacity(current.notes.len() + 1);
        notes.push(Note::new(content, author));
        notes.extend(current.notes);

        let confirmed = self.commit(id, CandidatePatch::notes(notes)).await?;
        info!(id, notes = confirmed.notes.len(), "note appended");
        Ok(confirmed)
    }

    // Send the patch and, once confirmed, swap the cached record.
    async fn commit(&self, id: &str, patch: CandidatePatch) -> Result<Candidate, PipelineError> {
        let confirmed = self
            .transport
            .update_candidate(id, &patch)
            .await
            .inspect_err(|err| warn!(id, error = %err, "update rejected by transport"))?;

        let mut candidates = self.write();
        let slot = candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PipelineError::NotFound(id.to_string()))?;
        *slot = confirmed.clone();
        Ok(confirmed)
    }

    fn begin_mutation(&self, id: &str) -> Result<MutationGuard<'_>, PipelineError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(id.to_string()) {
            warn!(id, "mutation refused: another update is in flight");
            return Err(PipelineError::MutationInFlight(id.to_string()));
        }
        Ok(MutationGuard {
            in_flight: &self.in_flight,
            id: id.to_string(),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Candidate>> {
        self.candidates.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Candidate>> {
        self.candidates.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// Releases the candidate id when the mutation finishes, on every path.
struct MutationGuard<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    id: String,
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
