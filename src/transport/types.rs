//! Request and response shapes for the transport contract.
//!
//! Pagination is offset-based with 1-indexed pages; a page number of 0 is
//! treated as 1 and a page size of 0 falls back to the query's default.

use serde::{Deserialize, Serialize};

use crate::jobs::{Job, JobSort, JobStatus};
use crate::pipeline::{Candidate, CandidateFilter, Stage};

pub const DEFAULT_CANDIDATE_PAGE_SIZE: u32 = 50;
pub const DEFAULT_JOB_PAGE_SIZE: u32 = 10;

/// Parameters for `get_candidates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub stage: Option<Stage>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for CandidateQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            stage: None,
            page: 1,
            page_size: DEFAULT_CANDIDATE_PAGE_SIZE,
        }
    }
}

impl CandidateQuery {
    pub fn filter(&self) -> CandidateFilter {
        CandidateFilter::new(self.search.clone(), self.stage)
    }
}

/// One page of candidates returned by `get_candidates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePage {
    pub candidates: Vec<Candidate>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

impl CandidatePage {
    /// Slice an already-filtered list according to `query`.
    pub fn from_filtered(filtered: Vec<Candidate>, query: &CandidateQuery) -> Self {
        let page_size = effective_page_size(query.page_size, DEFAULT_CANDIDATE_PAGE_SIZE);
        let window = PageWindow::new(query.page, page_size, filtered.len());
        let candidates = window.slice(filtered);

        Self {
            candidates,
            total: window.total,
            page: window.page,
            page_size,
            has_more: window.end < window.total,
        }
    }
}

/// Parameters for `get_jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub sort: JobSort,
    pub page: u32,
    pub page_size: u32,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: None,
            sort: JobSort::default(),
            page: 1,
            page_size: DEFAULT_JOB_PAGE_SIZE,
        }
    }
}

/// One page of jobs returned by `get_jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: usize,
}

impl JobPage {
    /// Slice an already-filtered and sorted list according to `query`.
    pub fn from_sorted(sorted: Vec<Job>, query: &JobQuery) -> Self {
        let page_size = effective_page_size(query.page_size, DEFAULT_JOB_PAGE_SIZE);
        let window = PageWindow::new(query.page, page_size, sorted.len());
        let total_pages = window.total.div_ceil(page_size as usize);
        let jobs = window.slice(sorted);

        Self {
            jobs,
            total: window.total,
            page: window.page,
            page_size,
            total_pages,
        }
    }
}

fn effective_page_size(requested: u32, default: u32) -> u32 {
    if requested == 0 { default } else { requested }
}

// Offset window over a list of `total` items.
struct PageWindow {
    page: u32,
    start: usize,
    end: usize,
    total: usize,
}

impl PageWindow {
    fn new(page: u32, page_size: u32, total: usize) -> Self {
        let page = page.max(1);
        let size = page_size as usize;
        let start = (page as usize - 1).saturating_mul(size);
        let end = start.saturating_add(size);
        Self {
            page,
            start,
            end,
            total,
        }
    }

    fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.start)
            .take(self.end - self.start)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> Vec<Candidate> {
        (1..=n)
            .map(|i| {
                Candidate::new(
                    i.to_string(),
                    format!("Candidate {i}"),
                    format!("c{i}@example.com"),
                    "1",
                )
            })
            .collect()
    }

    #[test]
    fn first_page_reports_more() {
        let query = CandidateQuery {
            page_size: 2,
            ..Default::default()
        };
        let page = CandidatePage::from_filtered(candidates(5), &query);
        assert_eq!(page.candidates.len(), 2);
        assert_eq!(page.candidates[0].id, "1");
        assert_eq!(page.total, 5);
        assert!(page.has_more);
    }

    #[test]
    fn last_page_is_partial() {
        let query = CandidateQuery {
            page: 3,
            page_size: 2,
            ..Default::default()
        };
        let page = CandidatePage::from_filtered(candidates(5), &query);
        assert_eq!(page.candidates.len(), 1);
        assert_eq!(page.candidates[0].id, "5");
        assert!(!page.has_more);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let query = CandidateQuery {
            page: 9,
            page_size: 2,
            ..Default::default()
        };
        let page = CandidatePage::from_filtered(candidates(5), &query);
        assert!(page.candidates.is_empty());
        assert_eq!(page.total, 5);
        assert!(!page.has_more);
    }

    #[test]
    fn page_zero_is_treated_as_first() {
        let query = CandidateQuery {
            page: 0,
            page_size: 2,
            ..Default::default()
        };
        let page = CandidatePage::from_filtered(candidates(3), &query);
        assert_eq!(page.page, 1);
        assert_eq!(page.candidates[0].id, "1");
    }

    #[test]
    fn zero_page_size_uses_default() {
        let query = CandidateQuery {
            page_size: 0,
            ..Default::default()
        };
        let page = CandidatePage::from_filtered(candidates(60), &query);
        assert_eq!(page.page_size, DEFAULT_CANDIDATE_PAGE_SIZE);
        assert_eq!(page.candidates.len(), 50);
    }

    #[test]
    fn query_serializes_camel_case() {
        let json = serde_json::to_value(CandidateQuery::default()).unwrap();
        assert_eq!(json["pageSize"], 50);
        assert_eq!(json["page"], 1);
    }
}
