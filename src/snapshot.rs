//! JSON snapshot of the whole dataset, written after every confirmed change
//! and read back on startup.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::TalentflowError;

pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no snapshot has been written yet.
    pub fn load(&self) -> Result<Option<Dataset>, TalentflowError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let dataset: Dataset = serde_json::from_str(&contents)?;
        debug!(
            path = %self.path.display(),
            jobs = dataset.jobs.len(),
            candidates = dataset.candidates.len(),
            "snapshot loaded"
        );
        Ok(Some(dataset))
    }

    /// Write the dataset to a sibling temp file, then rename it into place.
    pub fn save(&self, dataset: &Dataset) -> Result<(), TalentflowError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(dataset)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }

    /// Load the snapshot, or generate and persist a fresh seed dataset.
    pub fn load_or_seed(&self, count: usize, seed: u64) -> Result<Dataset, TalentflowError> {
        if let Some(dataset) = self.load()? {
            return Ok(dataset);
        }
        let dataset = Dataset::generate(count, seed);
        self.save(&dataset)?;
        info!(path = %self.path.display(), candidates = count, "seeded new dataset");
        Ok(dataset)
    }
}
