//! Wires config, snapshot, transport and stores together and runs one command.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::assessments::{Assessment, AssessmentStore, QuestionEdit};
use crate::cli::{AssessmentCommand, Command};
use crate::config::TalentflowConfig;
use crate::dataset::Dataset;
use crate::error::{AssessmentError, PipelineError, TalentflowError};
use crate::jobs::{JobBoard, JobDraft, JobPatch};
use crate::pipeline::PipelineStore;
use crate::snapshot::Snapshot;
use crate::transport::{CandidatePage, CandidateQuery, JobQuery, MockTransport};
use crate::ui::Ui;

pub struct App {
    config: TalentflowConfig,
    snapshot: Snapshot,
    store: PipelineStore<Arc<MockTransport>>,
    board: JobBoard<Arc<MockTransport>>,
    assessments: AssessmentStore<Arc<MockTransport>>,
    ui: Ui,
}

impl App {
    /// Load the snapshot (seeding a fresh dataset on first run) and build the stores.
    pub fn open(config: TalentflowConfig) -> Result<Self> {
        let snapshot = Snapshot::new(&config.snapshot_path);
        let dataset = snapshot.load_or_seed(config.seed_candidates, config.seed)?;
        Ok(Self::with_dataset(config, snapshot, dataset))
    }

    pub fn with_dataset(config: TalentflowConfig, snapshot: Snapshot, dataset: Dataset) -> Self {
        let transport = Arc::new(MockTransport::new(dataset.clone(), config.transport_config()));
        let store = PipelineStore::new(Arc::clone(&transport), dataset.candidates);
        let board = JobBoard::new(Arc::clone(&transport), dataset.jobs);
        let assessments = AssessmentStore::new(transport, dataset.assessments);
        Self {
            config,
            snapshot,
            store,
            board,
            assessments,
            ui: Ui::default(),
        }
    }

    pub async fn execute(&self, command: Command) -> Result<()> {
        debug!(?command, "executing");
        match command {
            Command::List {
                search,
                stage,
                page,
                page_size,
                cached,
            } => {
                let query = CandidateQuery {
                    search,
                    stage: stage.map(Into::into),
                    page,
                    page_size: page_size.unwrap_or(self.config.page_size),
                };
                let page = if cached {
                    let matching = self.store.list_candidates(&query.filter());
                    CandidatePage::from_filtered(matching, &query)
                } else {
                    self.ui
                        .busy("Loading candidates", self.store.refresh(&query))
                        .await?
                };
                self.ui.print_candidate_page(&page);
            }
            Command::Board => {
                if self.store.is_empty() {
                    return Err(TalentflowError::NoCandidates.into());
                }
                self.ui.print_board(&self.store.board());
            }
            Command::Show { id } => {
                let candidate = self.store.get_candidate(&id)?;
                self.ui.print_candidate(&candidate);
            }
            Command::Advance { id } => {
                let candidate = self
                    .ui
                    .busy("Advancing candidate", self.store.advance_stage(&id))
                    .await?;
                self.persist()?;
                self.ui
                    .success(&format!("{} moved to {}", candidate.name, candidate.stage));
            }
            Command::SetStage { id, stage } => {
                let candidate = self
                    .ui
                    .busy("Updating stage", self.store.set_stage_named(&id, &stage))
                    .await?;
                self.persist()?;
                self.ui
                    .success(&format!("{} is now {}", candidate.name, candidate.stage));
            }
            Command::Note { id, content, author } => {
                let author = author.unwrap_or_else(|| self.config.default_author.clone());
                let candidate = self
                    .ui
                    .busy("Saving note", self.store.append_note(&id, &content, &author))
                    .await?;
                self.persist()?;
                self.ui.success(&format!(
                    "Note added to {} ({} total)",
                    candidate.name,
                    candidate.notes.len()
                ));
            }
            Command::Jobs {
                search,
                status,
                sort,
                page,
                page_size,
            } => {
                let query = JobQuery {
                    search,
                    status: status.map(Into::into),
                    sort: sort.into(),
                    page,
                    page_size,
                };
                let page = self
                    .ui
                    .busy("Loading jobs", self.board.fetch_jobs(&query))
                    .await?;
                self.ui.print_job_page(&page);
            }
            Command::ReorderJob { from, to } => {
                self.ui
                    .busy("Reordering jobs", self.board.reorder(from, to))
                    .await?;
                self.persist()?;
                self.ui.success(&format!("Moved job {from} to position {to}"));
                self.ui.print_job_page(&self.board.list_jobs(&JobQuery::default()));
            }
            Command::Job { id } => {
                self.ui.print_job(&self.board.get_job(&id)?);
            }
            Command::JobCreate(args) => {
                let job = self
                    .ui
                    .busy("Creating job", self.board.create_job(JobDraft::from(args)))
                    .await?;
                self.persist()?;
                self.ui
                    .success(&format!("Created job {} ({}) at position {}", job.id, job.slug, job.order));
            }
            Command::JobUpdate(args) => {
                let (id, patch) = args.into_patch();
                if patch == JobPatch::default() {
                    return Err(PipelineError::InvalidJob("no fields to update".into()).into());
                }
                let job = self
                    .ui
                    .busy("Updating job", self.board.update_job(&id, &patch))
                    .await?;
                self.persist()?;
                self.ui.success(&format!("Updated job {} ({})", job.id, job.slug));
            }
            Command::JobArchive { id } => {
                let job = self
                    .ui
                    .busy("Updating job", self.board.toggle_archive(&id))
                    .await?;
                self.persist()?;
                self.ui.success(&format!("{} is now {}", job.title, job.status));
            }
            Command::Assessment { action } => self.execute_assessment(action).await?,
            Command::Seed { count, seed } => {
                let count = count.unwrap_or(self.config.seed_candidates);
                let dataset = Dataset::generate(count, seed.unwrap_or(self.config.seed));
                self.snapshot.save(&dataset)?;
                self.ui.success(&format!(
                    "Seeded {count} candidates into {}",
                    self.snapshot.path().display()
                ));
            }
        }
        Ok(())
    }

    async fn execute_assessment(&self, action: AssessmentCommand) -> Result<()> {
        match action {
            AssessmentCommand::Show { job_id } => {
                let assessment = match self.assessments.get(&job_id) {
                    Some(assessment) => assessment,
                    None => self
                        .ui
                        .busy("Loading assessment", self.assessments.fetch(&job_id))
                        .await?
                        .ok_or_else(|| PipelineError::AssessmentNotFound(job_id.clone()))?,
                };
                self.ui.print_assessment(&assessment);
            }
            AssessmentCommand::New {
                job_id,
                title,
                question,
            } => {
                self.board.get_job(&job_id)?;
                let mut assessment = Assessment::new(&job_id);
                assessment.set_title(&title);
                assessment.add_question(None, question.into_question())?;
                let saved = self
                    .ui
                    .busy("Saving assessment", self.assessments.create(assessment))
                    .await?;
                self.persist()?;
                self.ui
                    .success(&format!("Created \"{}\" for job {}", saved.title, saved.job_id));
            }
            AssessmentCommand::Title { job_id, title } => {
                let saved = self
                    .edit_assessment(&job_id, |a| {
                        a.set_title(&title);
                        Ok(())
                    })
                    .await?;
                self.ui.success(&format!("Assessment renamed to \"{}\"", saved.title));
            }
            AssessmentCommand::AddSection { job_id, title } => {
                let mut section_id = String::new();
                self.edit_assessment(&job_id, |a| {
                    section_id = a.add_section(title.as_deref());
                    Ok(())
                })
                .await?;
                self.ui.success(&format!("Added section {section_id}"));
            }
            AssessmentCommand::RenameSection {
                job_id,
                section_id,
                title,
            } => {
                self.edit_assessment(&job_id, |a| a.rename_section(&section_id, &title))
                    .await?;
                self.ui.success(&format!("Renamed section {section_id}"));
            }
            AssessmentCommand::RemoveSection { job_id, section_id } => {
                self.edit_assessment(&job_id, |a| a.remove_section(&section_id).map(drop))
                    .await?;
                self.ui.success(&format!("Removed section {section_id}"));
            }
            AssessmentCommand::AddQuestion {
                job_id,
                section,
                question,
            } => {
                let question = question.into_question();
                let question_id = question.id.clone();
                self.edit_assessment(&job_id, |a| {
                    a.add_question(section.as_deref(), question).map(drop)
                })
                .await?;
                self.ui.success(&format!("Added question {question_id}"));
            }
            AssessmentCommand::EditQuestion {
                job_id,
                question_id,
                text,
                kind,
                required,
                min,
                max,
                max_length,
            } => {
                let edit = QuestionEdit {
                    text,
                    kind: kind.map(Into::into),
                    required,
                    min_value: min,
                    max_value: max,
                    max_length,
                };
                self.edit_assessment(&job_id, |a| a.edit_question(&question_id, &edit))
                    .await?;
                self.ui.success(&format!("Updated question {question_id}"));
            }
            AssessmentCommand::RemoveQuestion {
                job_id,
                question_id,
            } => {
                self.edit_assessment(&job_id, |a| a.remove_question(&question_id).map(drop))
                    .await?;
                self.ui.success(&format!("Removed question {question_id}"));
            }
            AssessmentCommand::AddOption {
                job_id,
                question_id,
                text,
            } => {
                self.edit_assessment(&job_id, |a| a.add_option(&question_id, &text))
                    .await?;
                self.ui.success(&format!("Added option to {question_id}"));
            }
            AssessmentCommand::RemoveOption {
                job_id,
                question_id,
                index,
            } => {
                // The CLI counts options from 1.
                let idx = usize::try_from(index.saturating_sub(1)).unwrap_or(usize::MAX);
                self.edit_assessment(&job_id, |a| a.remove_option(&question_id, idx).map(drop))
                    .await?;
                self.ui.success(&format!("Removed option {index} from {question_id}"));
            }
        }
        Ok(())
    }

    /// Save one assessment change and persist the snapshot once confirmed.
    async fn edit_assessment<F>(&self, job_id: &str, change: F) -> Result<Assessment>
    where
        F: FnOnce(&mut Assessment) -> Result<(), AssessmentError>,
    {
        let saved = self
            .ui
            .busy("Saving assessment", self.assessments.edit(job_id, change))
            .await?;
        self.persist()?;
        Ok(saved)
    }

    fn persist(&self) -> Result<()> {
        let dataset = Dataset {
            jobs: self.board.snapshot(),
            candidates: self.store.snapshot(),
            assessments: self.assessments.snapshot(),
        };
        self.snapshot.save(&dataset)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::cli::{JobCreateArgs, JobUpdateArgs, QuestionArgs, QuestionTypeArg};
    use crate::jobs::JobStatus;
    use crate::pipeline::{Candidate, Stage};

    fn config(dir: &Path) -> TalentflowConfig {
        TalentflowConfig {
            latency_ms: 0,
            seed_candidates: 25,
            snapshot_path: dir.join("talentflow.json"),
            ..Default::default()
        }
    }

    fn app_with(dir: &Path, candidates: Vec<Candidate>) -> App {
        let config = config(dir);
        let snapshot = Snapshot::new(&config.snapshot_path);
        let dataset = Dataset {
            jobs: crate::dataset::seed_jobs(),
            candidates,
            assessments: crate::dataset::seed_assessments(),
        };
        App::with_dataset(config, snapshot, dataset)
    }

    fn reload(dir: &Path) -> Dataset {
        Snapshot::new(dir.join("talentflow.json")).load().unwrap().unwrap()
    }

    #[tokio::test]
    async fn open_seeds_snapshot_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::open(config(dir.path())).unwrap();
        assert_eq!(app.store.snapshot().len(), 25);
        assert_eq!(reload(dir.path()).candidates.len(), 25);
    }

    #[tokio::test]
    async fn advance_persists_confirmed_stage() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(
            dir.path(),
            vec![Candidate::new("42", "Sarah Jones", "sarah@example.com", "1").with_stage(Stage::Tech)],
        );

        app.execute(Command::Advance { id: "42".into() }).await.unwrap();

        let saved = reload(dir.path());
        assert_eq!(saved.candidates[0].stage, Stage::Offer);
        assert_eq!(saved.candidates[0].stage_history.len(), 1);
    }

    #[tokio::test]
    async fn failed_advance_does_not_write_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(
            dir.path(),
            vec![Candidate::new("1", "Jane Smith", "jane@example.com", "1").with_stage(Stage::Hired)],
        );

        let err = app.execute(Command::Advance { id: "1".into() }).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::TerminalStage { .. })
        ));
        assert!(!dir.path().join("talentflow.json").exists());
    }

    #[tokio::test]
    async fn note_uses_default_author() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(
            dir.path(),
            vec![Candidate::new("1", "Jane Smith", "jane@example.com", "1")],
        );

        app.execute(Command::Note {
            id: "1".into(),
            content: "Strong portfolio".into(),
            author: None,
        })
        .await
        .unwrap();

        let saved = reload(dir.path());
        assert_eq!(saved.candidates[0].notes[0].author, "Current User");
    }

    #[tokio::test]
    async fn set_stage_with_unknown_name_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(
            dir.path(),
            vec![Candidate::new("1", "Jane Smith", "jane@example.com", "1")],
        );

        let err = app
            .execute(Command::SetStage {
                id: "1".into(),
                stage: "onboarding".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidStage(_))
        ));
    }

    #[tokio::test]
    async fn reorder_job_persists_new_order() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new());

        app.execute(Command::ReorderJob { from: 5, to: 1 }).await.unwrap();

        let saved = reload(dir.path());
        assert_eq!(saved.jobs[0].id, "5");
        assert_eq!(saved.jobs[0].order, 1);
        assert_eq!(app.board.snapshot()[0].id, "5");
    }

    #[tokio::test]
    async fn cached_list_reads_local_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(
            dir.path(),
            vec![
                Candidate::new("1", "Jane Smith", "jane@example.com", "1"),
                Candidate::new("2", "John Doe", "john@example.com", "1"),
            ],
        );

        app.execute(Command::List {
            search: "jane".into(),
            stage: None,
            page: 1,
            page_size: None,
            cached: true,
        })
        .await
        .unwrap();
        assert!(!dir.path().join("talentflow.json").exists());
    }

    #[tokio::test]
    async fn seed_replaces_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new());

        app.execute(Command::Seed {
            count: Some(5),
            seed: Some(9),
        })
        .await
        .unwrap();

        assert_eq!(reload(dir.path()).candidates.len(), 5);
    }

    fn question(text: &str) -> QuestionArgs {
        QuestionArgs {
            text: text.into(),
            kind: QuestionTypeArg::LongText,
            required: true,
            options: Vec::new(),
            min: None,
            max: None,
            max_length: Some(500),
        }
    }

    #[tokio::test]
    async fn board_without_candidates_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new());

        let err = app.execute(Command::Board).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TalentflowError>(),
            Some(TalentflowError::NoCandidates)
        ));
    }

    #[tokio::test]
    async fn job_create_and_archive_persist() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new());

        app.execute(Command::JobCreate(JobCreateArgs {
            title: "Data Engineer".into(),
            slug: None,
            status: None,
            description: "Build pipelines".into(),
            requirements: vec!["SQL".into()],
            tags: Vec::new(),
        }))
        .await
        .unwrap();
        app.execute(Command::JobArchive { id: "6".into() }).await.unwrap();

        let saved = reload(dir.path());
        let job = saved.jobs.iter().find(|j| j.id == "6").unwrap();
        assert_eq!(job.slug, "data-engineer");
        assert_eq!(job.status, JobStatus::Archived);
    }

    #[tokio::test]
    async fn job_update_without_fields_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new());

        let err = app
            .execute(Command::JobUpdate(JobUpdateArgs {
                id: "1".into(),
                title: None,
                slug: None,
                status: None,
                description: None,
                requirements: Vec::new(),
                tags: Vec::new(),
            }))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidJob(_))
        ));
        assert!(!dir.path().join("talentflow.json").exists());
    }

    #[tokio::test]
    async fn assessment_flow_persists_each_confirmed_change() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new());

        app.execute(Command::Assessment {
            action: AssessmentCommand::New {
                job_id: "2".into(),
                title: "Backend screening".into(),
                question: question("Describe an outage you handled"),
            },
        })
        .await
        .unwrap();
        app.execute(Command::Assessment {
            action: AssessmentCommand::AddSection {
                job_id: "2".into(),
                title: Some("Systems".into()),
            },
        })
        .await
        .unwrap();

        let saved = reload(dir.path());
        let backend = saved.assessments.iter().find(|a| a.job_id == "2").unwrap();
        assert_eq!(backend.sections.len(), 2);
        assert_eq!(backend.sections[1].title, "Systems");
        assert_eq!(backend.sections[0].questions[0].max_length, Some(500));
        assert_eq!(saved.assessments.len(), 2);
    }

    #[tokio::test]
    async fn remove_option_counts_from_one() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new());

        app.execute(Command::Assessment {
            action: AssessmentCommand::RemoveOption {
                job_id: "1".into(),
                question_id: "q1".into(),
                index: 1,
            },
        })
        .await
        .unwrap();

        let saved = reload(dir.path());
        let options = &saved.assessments[0].sections[0].questions[0].options;
        assert_eq!(options, &vec!["Vue".to_string(), "Angular".into(), "Svelte".into()]);
    }

    #[tokio::test]
    async fn invalid_assessment_edit_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new());

        let err = app
            .execute(Command::Assessment {
                action: AssessmentCommand::AddOption {
                    job_id: "1".into(),
                    question_id: "missing".into(),
                    text: "Elm".into(),
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Assessment(AssessmentError::QuestionNotFound(_)))
        ));
        assert!(!dir.path().join("talentflow.json").exists());
    }

    #[tokio::test]
    async fn new_assessment_needs_known_job() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new());

        let err = app
            .execute(Command::Assessment {
                action: AssessmentCommand::New {
                    job_id: "99".into(),
                    title: "Ghost".into(),
                    question: question("Anyone there?"),
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnknownJob(_))
        ));
    }
}
