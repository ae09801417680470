use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AssessmentError;

/// The kinds of question an assessment can ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    #[default]
    ShortText,
    LongText,
    Numeric,
    FileUpload,
}

impl QuestionType {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "Single Choice",
            QuestionType::MultiChoice => "Multiple Choice",
            QuestionType::ShortText => "Short Text",
            QuestionType::LongText => "Long Text",
            QuestionType::Numeric => "Numeric",
            QuestionType::FileUpload => "File Upload",
        }
    }

    /// Choice questions carry an option list.
    pub fn has_options(&self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultiChoice)
    }

    /// Text questions may cap the answer length.
    pub fn is_text(&self) -> bool {
        matches!(self, QuestionType::ShortText | QuestionType::LongText)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    /// Numeric questions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Text questions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl Question {
    pub fn new(kind: QuestionType, text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            question: text.trim().to_string(),
            options: Vec::new(),
            required: false,
            min_value: None,
            max_value: None,
            max_length: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Apply the fields present in `edit`, then drop settings that do not fit
    /// the (possibly new) question type.
    pub fn edit(&mut self, edit: &QuestionEdit) {
        if let Some(text) = &edit.text {
            self.question = text.trim().to_string();
        }
        if let Some(kind) = edit.kind {
            self.kind = kind;
        }
        if let Some(required) = edit.required {
            self.required = required;
        }
        if edit.min_value.is_some() {
            self.min_value = edit.min_value;
        }
        if edit.max_value.is_some() {
            self.max_value = edit.max_value;
        }
        if edit.max_length.is_some() {
            self.max_length = edit.max_length;
        }

        if !self.kind.has_options() {
            self.options.clear();
        }
        if self.kind != QuestionType::Numeric {
            self.min_value = None;
            self.max_value = None;
        }
        if !self.kind.is_text() {
            self.max_length = None;
        }
    }

    pub fn check(&self) -> Result<(), AssessmentError> {
        if self.question.trim().is_empty() {
            return Err(AssessmentError::EmptyQuestion(self.id.clone()));
        }
        let filled = self.options.iter().filter(|o| !o.trim().is_empty()).count();
        if self.kind.has_options() && filled < 2 {
            return Err(AssessmentError::TooFewOptions(self.id.clone()));
        }
        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(AssessmentError::InvalidRange(self.id.clone()));
            }
        }
        Ok(())
    }
}

/// Partial update of a question. `None` leaves the field as it is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuestionEdit {
    pub text: Option<String>,
    pub kind: Option<QuestionType>,
    pub required: Option<bool>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub max_length: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Section {
    pub fn new(title: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            questions: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// A per-job questionnaire made of titled sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub job_id: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Assessment {
    /// An untitled assessment with one empty "General Questions" section.
    pub fn new(job_id: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            title: String::new(),
            sections: vec![Section::new("General Questions")],
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.trim().to_string();
    }

    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// Append a section and return its id. A blank title becomes `Section <n>`.
    pub fn add_section(&mut self, title: Option<&str>) -> String {
        let title = match title.map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Section {}", self.sections.len() + 1),
        };
        let section = Section::new(&title);
        let id = section.id.clone();
        self.sections.push(section);
        id
    }

    pub fn rename_section(&mut self, section_id: &str, title: &str) -> Result<(), AssessmentError> {
        self.section_mut(section_id)?.title = title.trim().to_string();
        Ok(())
    }

    /// Remove a section and its questions. The last section cannot go.
    pub fn remove_section(&mut self, section_id: &str) -> Result<Section, AssessmentError> {
        let idx = self
            .sections
            .iter()
            .position(|s| s.id == section_id)
            .ok_or_else(|| AssessmentError::SectionNotFound(section_id.to_string()))?;
        if self.sections.len() == 1 {
            return Err(AssessmentError::LastSection);
        }
        Ok(self.sections.remove(idx))
    }

    /// Append a question to `section_id`, or to the last section when `None`.
    pub fn add_question(
        &mut self,
        section_id: Option<&str>,
        question: Question,
    ) -> Result<String, AssessmentError> {
        let section = match section_id {
            Some(id) => self.section_mut(id)?,
            None => self
                .sections
                .last_mut()
                .ok_or_else(|| AssessmentError::SectionNotFound(String::new()))?,
        };
        let id = question.id.clone();
        section.questions.push(question);
        Ok(id)
    }

    pub fn edit_question(
        &mut self,
        question_id: &str,
        edit: &QuestionEdit,
    ) -> Result<(), AssessmentError> {
        self.question_mut(question_id)?.edit(edit);
        Ok(())
    }

    pub fn remove_question(&mut self, question_id: &str) -> Result<Question, AssessmentError> {
        for section in &mut self.sections {
            if let Some(idx) = section.questions.iter().position(|q| q.id == question_id) {
                return Ok(section.questions.remove(idx));
            }
        }
        Err(AssessmentError::QuestionNotFound(question_id.to_string()))
    }

    pub fn add_option(&mut self, question_id: &str, option: &str) -> Result<(), AssessmentError> {
        let question = self.question_mut(question_id)?;
        if !question.kind.has_options() {
            return Err(AssessmentError::NotAChoice(question_id.to_string()));
        }
        question.options.push(option.trim().to_string());
        Ok(())
    }

    /// Remove the option at `index`. Choice questions keep at least two.
    pub fn remove_option(&mut self, question_id: &str, index: usize) -> Result<String, AssessmentError> {
        let question = self.question_mut(question_id)?;
        if index >= question.options.len() {
            return Err(AssessmentError::OptionNotFound {
                question: question_id.to_string(),
                index,
            });
        }
        if question.options.len() <= 2 {
            return Err(AssessmentError::TooFewOptions(question_id.to_string()));
        }
        Ok(question.options.remove(index))
    }

    /// Rules checked before an assessment is saved.
    pub fn validate(&self) -> Result<(), AssessmentError> {
        if self.title.trim().is_empty() {
            return Err(AssessmentError::MissingTitle);
        }
        if self.question_count() == 0 {
            return Err(AssessmentError::NoQuestions);
        }
        self.sections
            .iter()
            .flat_map(|s| &s.questions)
            .try_for_each(Question::check)
    }

    fn section_mut(&mut self, section_id: &str) -> Result<&mut Section, AssessmentError> {
        self.sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or_else(|| AssessmentError::SectionNotFound(section_id.to_string()))
    }

    fn question_mut(&mut self, question_id: &str) -> Result<&mut Question, AssessmentError> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.questions.iter_mut())
            .find(|q| q.id == question_id)
            .ok_or_else(|| AssessmentError::QuestionNotFound(question_id.to_string()))
    }
}
