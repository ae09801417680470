mod model;
mod store;

pub use model::{Assessment, Question, QuestionEdit, QuestionType, Section};
pub use store::AssessmentStore;
