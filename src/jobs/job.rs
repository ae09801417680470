use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::transport::types::{JobPage, JobQuery};

/// Whether a job is open for applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Archived,
}

impl JobStatus {
    pub fn toggled(self) -> Self {
        match self {
            JobStatus::Active => JobStatus::Archived,
            JobStatus::Archived => JobStatus::Active,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            JobStatus::Active => "active",
            JobStatus::Archived => "archived",
        })
    }
}

/// Sort key for job listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSort {
    #[default]
    Order,
    Title,
}

/// An open (or archived) position candidates apply to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub status: JobStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 1-based board position; contiguous across all jobs.
    pub order: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Merge the fields present in `patch`. A new title without an explicit
    /// slug re-derives the slug from the title.
    pub fn apply(&mut self, patch: &JobPatch) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
            if patch.slug.is_none() {
                self.slug = slugify(&self.title);
            }
        }
        if let Some(slug) = &patch.slug {
            self.slug = slug.trim().to_string();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(description) = &patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(requirements) = &patch.requirements {
            self.requirements = clean_requirements(requirements);
        }
        if let Some(tags) = &patch.tags {
            self.tags = clean_tags(tags);
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        check_required(&self.title, &self.slug, &self.description, &self.requirements)
    }
}

/// Fields for a job that does not exist yet. The backend assigns id, order
/// and creation time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobDraft {
    pub title: String,
    /// Derived from the title when blank.
    pub slug: String,
    pub status: JobStatus,
    pub description: String,
    pub requirements: Vec<String>,
    pub tags: Vec<String>,
}

impl JobDraft {
    /// Trim every field, derive a blank slug, drop blank requirements and
    /// duplicate tags, then check the required fields.
    pub fn normalize(self) -> Result<Self, PipelineError> {
        let title = self.title.trim().to_string();
        let slug = match self.slug.trim() {
            "" => slugify(&title),
            slug => slug.to_string(),
        };
        let draft = Self {
            slug,
            title,
            status: self.status,
            description: self.description.trim().to_string(),
            requirements: clean_requirements(&self.requirements),
            tags: clean_tags(&self.tags),
        };
        check_required(&draft.title, &draft.slug, &draft.description, &draft.requirements)?;
        Ok(draft)
    }

    pub fn into_job(self, id: String, order: u32, created_at: DateTime<Utc>) -> Job {
        Job {
            id,
            title: self.title,
            slug: self.slug,
            status: self.status,
            tags: self.tags,
            order,
            description: self.description,
            requirements: self.requirements,
            created_at,
        }
    }
}

/// Partial update of a job. `None` leaves the field as it is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub status: Option<JobStatus>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Lowercase the title, drop everything but ASCII letters, digits, whitespace
/// and `-`, turn whitespace runs into `-` and trim `-` from both ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.to_lowercase().chars() {
        if ch.is_whitespace() {
            pending_dash = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(ch);
        }
    }
    slug.trim_matches('-').to_string()
}

fn check_required(
    title: &str,
    slug: &str,
    description: &str,
    requirements: &[String],
) -> Result<(), PipelineError> {
    let missing = if title.trim().is_empty() {
        "title is required"
    } else if slug.trim().is_empty() {
        "slug is required"
    } else if description.trim().is_empty() {
        "description is required"
    } else if requirements.iter().all(|r| r.trim().is_empty()) {
        "at least one requirement is needed"
    } else {
        return Ok(());
    };
    Err(PipelineError::InvalidJob(missing.to_string()))
}

fn clean_requirements(requirements: &[String]) -> Vec<String> {
    requirements
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_tags(tags: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !cleaned.iter().any(|existing| existing == tag) {
            cleaned.push(tag.to_string());
        }
    }
    cleaned
}

/// Filter, sort and paginate a job list.
pub fn query_jobs<'a, I>(jobs: I, query: &JobQuery) -> JobPage
where
    I: IntoIterator<Item = &'a Job>,
{
    let needle = query.search.to_lowercase();
    let mut matching: Vec<Job> = jobs
        .into_iter()
        .filter(|job| needle.is_empty() || job.title.to_lowercase().contains(&needle))
        .filter(|job| query.status.is_none_or(|status| job.status == status))
        .cloned()
        .collect();

    match query.sort {
        JobSort::Order => matching.sort_by_key(|job| job.order),
        JobSort::Title => matching.sort_by(|a, b| a.title.cmp(&b.title)),
    }

    JobPage::from_sorted(matching, query)
}

/// Move the job at position `from_order` to `to_order` and renumber every
/// job to `1..=n` in the new order.
///
/// Returns the offending position when either is outside `1..=n`; the list is
/// left untouched in that case.
pub fn reorder(jobs: &mut Vec<Job>, from_order: u32, to_order: u32) -> Result<(), u32> {
    let len = jobs.len();
    let position = |order: u32| {
        let idx = (order as usize).checked_sub(1)?;
        (idx < len).then_some(idx)
    };

    let from = position(from_order).ok_or(from_order)?;
    let to = position(to_order).ok_or(to_order)?;

    jobs.sort_by_key(|job| job.order);
    let job = jobs.remove(from);
    jobs.insert(to, job);
    for (idx, job) in jobs.iter_mut().enumerate() {
        job.order = idx as u32 + 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::seed_jobs;

    fn titles(page: &JobPage) -> Vec<&str> {
        page.jobs.iter().map(|j| j.title.as_str()).collect()
    }

    #[test]
    fn default_query_sorts_by_order() {
        let jobs = seed_jobs();
        let page = query_jobs(&jobs, &JobQuery::default());
        let orders: Vec<_> = page.jobs.iter().map(|j| j.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn search_matches_title_case_insensitively() {
        let jobs = seed_jobs();
        let query = JobQuery {
            search: "ENGINEER".into(),
            ..Default::default()
        };
        let page = query_jobs(&jobs, &query);
        assert_eq!(titles(&page), vec!["Backend Engineer", "DevOps Engineer"]);
    }

    #[test]
    fn status_filter_and_title_sort() {
        let jobs = seed_jobs();
        let query = JobQuery {
            status: Some(JobStatus::Active),
            sort: JobSort::Title,
            ..Default::default()
        };
        let page = query_jobs(&jobs, &query);
        assert_eq!(
            titles(&page),
            vec![
                "Backend Engineer",
                "Product Manager",
                "Senior Frontend Developer",
                "UX Designer"
            ]
        );
    }

    #[test]
    fn pagination_reports_total_pages() {
        let jobs = seed_jobs();
        let query = JobQuery {
            page: 2,
            page_size: 2,
            ..Default::default()
        };
        let page = query_jobs(&jobs, &query);
        assert_eq!(page.jobs.len(), 2);
        assert_eq!(page.jobs[0].order, 3);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn reorder_moves_down_and_renumbers() {
        let mut jobs = seed_jobs();
        reorder(&mut jobs, 1, 4).unwrap();
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "4", "1", "5"]);
        assert!(jobs.iter().enumerate().all(|(i, j)| j.order == i as u32 + 1));
    }

    #[test]
    fn reorder_moves_up() {
        let mut jobs = seed_jobs();
        reorder(&mut jobs, 5, 1).unwrap();
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "1", "2", "3", "4"]);
    }

    #[test]
    fn reorder_rejects_out_of_range_positions() {
        let mut jobs = seed_jobs();
        let before = jobs.clone();
        assert_eq!(reorder(&mut jobs, 0, 2), Err(0));
        assert_eq!(reorder(&mut jobs, 2, 6), Err(6));
        assert_eq!(jobs, before);
    }

    fn draft(title: &str) -> JobDraft {
        JobDraft {
            title: title.into(),
            description: "Own the data platform.".into(),
            requirements: vec!["Rust".into()],
            ..Default::default()
        }
    }

    #[test]
    fn slug_follows_title() {
        assert_eq!(slugify("Senior Frontend Developer"), "senior-frontend-developer");
        assert_eq!(slugify("  C++ / Rust   Engineer! "), "c-rust-engineer");
        assert_eq!(slugify("Node.js Lead"), "nodejs-lead");
        assert_eq!(slugify("Ops - On Call"), "ops---on-call");
        assert_eq!(slugify("Ingénieur"), "ingnieur");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn draft_normalizes_fields_and_derives_slug() {
        let draft = JobDraft {
            title: "  Data Engineer ".into(),
            requirements: vec!["  SQL ".into(), "   ".into(), "Spark".into()],
            tags: vec!["Remote".into(), " Remote ".into(), "".into(), "EU".into()],
            ..draft("")
        }
        .normalize()
        .unwrap();

        assert_eq!(draft.title, "Data Engineer");
        assert_eq!(draft.slug, "data-engineer");
        assert_eq!(draft.requirements, vec!["SQL", "Spark"]);
        assert_eq!(draft.tags, vec!["Remote", "EU"]);
        assert_eq!(draft.status, JobStatus::Active);
    }

    #[test]
    fn draft_keeps_explicit_slug() {
        let draft = JobDraft {
            slug: " data-eng ".into(),
            ..draft("Data Engineer")
        }
        .normalize()
        .unwrap();
        assert_eq!(draft.slug, "data-eng");
    }

    #[test]
    fn draft_requires_every_form_field() {
        let cases = [
            (draft("   "), "title is required"),
            (draft("!!!"), "slug is required"),
            (
                JobDraft {
                    description: " ".into(),
                    ..draft("Data Engineer")
                },
                "description is required",
            ),
            (
                JobDraft {
                    requirements: vec![" ".into()],
                    ..draft("Data Engineer")
                },
                "at least one requirement is needed",
            ),
        ];
        for (draft, message) in cases {
            let err = draft.normalize().unwrap_err();
            assert!(matches!(err, PipelineError::InvalidJob(ref m) if m == message), "{err}");
        }
    }

    #[test]
    fn patch_with_new_title_rederives_slug() {
        let mut job = seed_jobs().remove(1);
        job.apply(&JobPatch {
            title: Some("Platform Engineer".into()),
            ..Default::default()
        });
        assert_eq!(job.slug, "platform-engineer");
        assert_eq!(job.description, "Backend engineer for scalable applications.");

        job.apply(&JobPatch {
            title: Some("Platform Engineer II".into()),
            slug: Some("platform".into()),
            ..Default::default()
        });
        assert_eq!(job.slug, "platform");
    }

    #[test]
    fn patched_job_is_revalidated() {
        let mut job = seed_jobs().remove(0);
        job.apply(&JobPatch {
            requirements: Some(vec!["".into()]),
            ..Default::default()
        });
        assert!(job.requirements.is_empty());
        assert!(matches!(job.validate(), Err(PipelineError::InvalidJob(_))));
    }

    #[test]
    fn status_toggles() {
        assert_eq!(JobStatus::Active.toggled(), JobStatus::Archived);
        assert_eq!(JobStatus::Archived.toggled(), JobStatus::Active);
    }

    #[test]
    fn job_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&JobStatus::Archived).unwrap(), "\"archived\"");
    }
}
