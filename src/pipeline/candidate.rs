use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::Stage;

/// A free-form remark left on a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Build a note with a fresh id and the current timestamp. Content is trimmed.
    pub fn new(content: &str, author: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.trim().to_string(),
            author: author.trim().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// One confirmed stage change, kept for the candidate timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageChange {
    pub from: Stage,
    pub to: Stage,
    pub at: DateTime<Utc>,
}

/// A single applicant tracked through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub email: String,
    pub job_id: String,
    pub stage: Stage,
    pub applied_at: DateTime<Utc>,
    /// Most recent first.
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub stage_history: Vec<StageChange>,
}

impl Candidate {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        job_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            job_id: job_id.into(),
            stage: Stage::Applied,
            applied_at: Utc::now(),
            notes: Vec::new(),
            stage_history: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_applied_at(mut self, applied_at: DateTime<Utc>) -> Self {
        self.applied_at = applied_at;
        self
    }

    /// Merge a partial update into this record.
    ///
    /// A stage change to a different stage is appended to `stage_history`;
    /// setting the current stage again records nothing.
    pub fn apply(&mut self, patch: &CandidatePatch) {
        if let Some(stage) = patch.stage {
            if stage != self.stage {
                self.stage_history.push(StageChange {
                    from: self.stage,
                    to: stage,
                    at: Utc::now(),
                });
                self.stage = stage;
            }
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
    }
}

/// Partial fields accepted by `update_candidate`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Replaces the whole note list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Note>>,
}

impl CandidatePatch {
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Default::default()
        }
    }

    pub fn notes(notes: Vec<Note>) -> Self {
        Self {
            notes: Some(notes),
            ..Default::default()
        }
    }
}
