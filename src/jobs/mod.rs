mod board;
mod job;

pub use board::JobBoard;
pub use job::{Job, JobDraft, JobPatch, JobSort, JobStatus, query_jobs, reorder};
