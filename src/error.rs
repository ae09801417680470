use thiserror::Error;

use crate::pipeline::Stage;
use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum TalentflowError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("No candidates found. Run `talentflow seed` first.")]
    NoCandidates,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failures of the pipeline store, job board and assessment store. None of
/// them change state.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Candidate not found: {0}")]
    NotFound(String),

    #[error("Invalid stage: {0:?}")]
    InvalidStage(String),

    #[error("Candidate {id} is already in terminal stage {stage}")]
    TerminalStage { id: String, stage: Stage },

    #[error("Note content must not be empty")]
    EmptyNote,

    #[error("Transport failure: {0}")]
    TransportFailure(#[from] TransportError),

    #[error("Another update for candidate {0} is still in flight")]
    MutationInFlight(String),

    #[error("No job at position {0}")]
    JobNotFound(u32),

    #[error("Job not found: {0}")]
    UnknownJob(String),

    #[error("Invalid job: {0}")]
    InvalidJob(String),

    #[error("No assessment for job {0}")]
    AssessmentNotFound(String),

    #[error("Job {0} already has an assessment")]
    AssessmentExists(String),

    #[error(transparent)]
    Assessment(#[from] AssessmentError),
}

/// Rule violations while building or saving an assessment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssessmentError {
    #[error("Assessment title is required")]
    MissingTitle,

    #[error("Assessment needs at least one question")]
    NoQuestions,

    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Question not found: {0}")]
    QuestionNotFound(String),

    #[error("An assessment keeps at least one section")]
    LastSection,

    #[error("Question {0} has no text")]
    EmptyQuestion(String),

    #[error("Question {0} does not take options")]
    NotAChoice(String),

    #[error("Question {0} needs at least two options")]
    TooFewOptions(String),

    #[error("Question {question} has no option {}", .index + 1)]
    OptionNotFound { question: String, index: usize },

    #[error("Question {0} has a minimum above its maximum")]
    InvalidRange(String),
}
