//! Seed data: the fixed job catalogue, its sample assessment and randomly
//! generated candidates.
//!
//! Generation is driven by a seeded [`StdRng`], so the same `(count, seed, now)`
//! always yields the same candidates.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::assessments::{Assessment, Question, QuestionType, Section};
use crate::jobs::{Job, JobStatus};
use crate::pipeline::{Candidate, Stage};

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Michael", "Sarah", "David", "Lisa", "Robert", "Emily", "James", "Emma",
];

const LAST_NAMES: &[&str] = &[
    "Smith",
    "Johnson",
    "Williams",
    "Brown",
    "Jones",
    "Garcia",
    "Miller",
    "Davis",
    "Rodriguez",
    "Martinez",
];

/// Applications are spread over the last thirty days.
const APPLIED_WINDOW_SECS: i64 = 30 * 24 * 60 * 60;

/// The whole jobs, candidates and assessments collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub jobs: Vec<Job>,
    pub candidates: Vec<Candidate>,
    /// Snapshots written before assessments existed load with none.
    #[serde(default)]
    pub assessments: Vec<Assessment>,
}

impl Dataset {
    /// The fixed jobs and assessment plus `count` generated candidates.
    pub fn generate(count: usize, seed: u64) -> Self {
        Self::generate_at(count, seed, Utc::now())
    }

    pub fn generate_at(count: usize, seed: u64, now: DateTime<Utc>) -> Self {
        let jobs = seed_jobs();
        let job_ids: Vec<String> = jobs.iter().map(|job| job.id.clone()).collect();
        let candidates = generate_candidates(count, seed, &job_ids, now);
        Self {
            jobs,
            candidates,
            assessments: seed_assessments(),
        }
    }
}

/// The five jobs every fresh dataset starts with.
pub fn seed_jobs() -> Vec<Job> {
    let catalogue: [(&str, &str, JobStatus, &[&str], &str, &[&str]); 5] = [
        (
            "Senior Frontend Developer",
            "senior-frontend-developer",
            JobStatus::Active,
            &["React", "TypeScript", "Remote"],
            "We are looking for a senior frontend developer to join our team.",
            &["5+ years React experience", "TypeScript proficiency", "Team leadership"],
        ),
        (
            "Backend Engineer",
            "backend-engineer",
            JobStatus::Active,
            &["Node.js", "Python", "AWS"],
            "Backend engineer for scalable applications.",
            &["3+ years backend experience", "Cloud platforms", "API design"],
        ),
        (
            "Product Manager",
            "product-manager",
            JobStatus::Active,
            &["Strategy", "Analytics", "Leadership"],
            "Lead product strategy and roadmap execution.",
            &["Product management experience", "Data analysis", "Cross-functional leadership"],
        ),
        (
            "DevOps Engineer",
            "devops-engineer",
            JobStatus::Archived,
            &["Docker", "Kubernetes", "CI/CD"],
            "Infrastructure and deployment automation.",
            &["Container orchestration", "CI/CD pipelines", "Monitoring"],
        ),
        (
            "UX Designer",
            "ux-designer",
            JobStatus::Active,
            &["Figma", "User Research", "Prototyping"],
            "Create exceptional user experiences.",
            &["Design portfolio", "User research", "Prototyping tools"],
        ),
    ];

    catalogue.into_iter()
        .enumerate()
        .map(|(idx, (title, slug, status, tags, description, requirements))| {
            let n = idx as u32 + 1;
            Job {
                id: n.to_string(),
                title: title.to_string(),
                slug: slug.to_string(),
                status,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                order: n,
                description: description.to_string(),
                requirements: requirements.iter().map(|r| r.to_string()).collect(),
                created_at: january_2025(n),
            }
        })
        .collect()
}

/// The sample assessment attached to the first job.
pub fn seed_assessments() -> Vec<Assessment> {
    let frontend = Section::new("Technical Skills").with_id("section1");
    let mut assessment = Assessment {
        job_id: "1".into(),
        title: "Frontend Developer Assessment".into(),
        sections: vec![frontend],
    };
    assessment.sections[0].questions = vec![
        Question::new(QuestionType::SingleChoice, "What is your primary frontend framework?")
            .with_id("q1")
            .with_options(["React", "Vue", "Angular", "Svelte"])
            .required(true),
        Question::new(QuestionType::MultiChoice, "Which of these have you worked with?")
            .with_id("q2")
            .with_options(["TypeScript", "GraphQL", "Redux", "Next.js"])
            .required(true),
    ];
    vec![assessment]
}

/// Generate `count` candidates with ids `"1"..=count`.
///
/// Stage is drawn uniformly from all six stages and the job uniformly from
/// `job_ids`; an empty `job_ids` leaves `job_id` empty.
pub fn generate_candidates(
    count: usize,
    seed: u64,
    job_ids: &[String],
    now: DateTime<Utc>,
) -> Vec<Candidate> {
    let mut rng = StdRng::seed_from_u64(seed);

    (1..=count)
        .map(|i| {
            let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Alex");
            let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Doe");
            let stage = Stage::ALL.choose(&mut rng).copied().unwrap_or(Stage::Applied);
            let job_id = job_ids.choose(&mut rng).cloned().unwrap_or_default();
            let ago = Duration::seconds(rng.gen_range(0..APPLIED_WINDOW_SECS));

            Candidate::new(
                i.to_string(),
                format!("{first} {last}"),
                format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
                job_id,
            )
            .with_stage(stage)
            .with_applied_at(now - ago)
        })
        .collect()
}

fn january_2025(day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 1, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}
