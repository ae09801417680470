//! Search/filter pass over a candidate list.
//!
//! Shared by the [`PipelineStore`](super::PipelineStore) and the mock
//! transport's server-side filtering so both sides agree on what matches.

use serde::{Deserialize, Serialize};

use super::candidate::Candidate;
use super::stage::Stage;

/// Criteria for `list_candidates`. The default value matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFilter {
    /// Case-insensitive substring of name or email. Empty matches all.
    #[serde(default)]
    pub search: String,
    /// Exact stage. `None` matches all.
    #[serde(default)]
    pub stage: Option<Stage>,
}

impl CandidateFilter {
    pub fn new(search: impl Into<String>, stage: Option<Stage>) -> Self {
        Self {
            search: search.into(),
            stage,
        }
    }

    pub fn matches(&self, candidate: &Candidate) -> bool {
        if let Some(stage) = self.stage {
            if candidate.stage != stage {
                return false;
            }
        }
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        candidate.name.to_lowercase().contains(&needle)
            || candidate.email.to_lowercase().contains(&needle)
    }
}

/// Stable filter: matching candidates keep their relative input order.
pub fn filter_candidates<'a, I>(candidates: I, filter: &CandidateFilter) -> Vec<Candidate>
where
    I: IntoIterator<Item = &'a Candidate>,
{
    candidates
        .into_iter()
        .filter(|c| filter.matches(c))
        .cloned()
        .collect()
}
