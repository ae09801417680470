mod candidate;
mod filter;
mod stage;
mod store;

pub use candidate::{Candidate, CandidatePatch};
pub use filter::{CandidateFilter, filter_candidates};
pub use stage::Stage;
pub use store::PipelineStore;
