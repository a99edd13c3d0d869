//! Persisted set of product ids whose SEO fields were already written.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to access tracker file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tracker file: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct TrackerFile {
    #[serde(default)]
    updated_ids: BTreeMap<u64, bool>,
}

#[derive(Debug, Default)]
pub struct UpdateTracker {
    updated: Mutex<BTreeSet<u64>>,
}

impl UpdateTracker {
    /// Loads the tracker from `path`; a missing file yields an empty tracker.
    pub fn load(path: &Path) -> Result<Self, TrackerError> {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        let file: TrackerFile = serde_json::from_slice(&raw)?;
        let updated = file
            .updated_ids
            .into_iter()
            .filter_map(|(id, done)| done.then_some(id))
            .collect::<BTreeSet<_>>();
        info!(target: "wooh.tracker", tracked = updated.len(), "tracker_loaded");
        Ok(Self {
            updated: Mutex::new(updated),
        })
    }

    pub fn reset() -> Self {
        info!(target: "wooh.tracker", "starting fresh tracker");
        Self::default()
    }

    pub fn is_marked(&self, product_id: u64) -> bool {
        self.ids().contains(&product_id)
    }

    pub fn mark(&self, product_id: u64) {
        self.ids().insert(product_id);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.ids().len()
    }

    #[cfg(test)]
    pub fn marked(&self) -> Vec<u64> {
        self.ids().iter().copied().collect()
    }

    /// Replaces `path` with the full set. The previous file stays intact
    /// until the new one is completely written.
    pub fn save(&self, path: &Path) -> Result<(), TrackerError> {
        let ids = self.ids();
        let file = TrackerFile {
            updated_ids: ids.iter().map(|id| (*id, true)).collect(),
        };
        let data = serde_json::to_vec(&file)?;
        crate::persist::write_atomic(path, &data)?;
        Ok(())
    }

    /// Saves and logs a failure instead of returning it; the in-memory state
    /// stays authoritative for the rest of the run.
    pub fn save_or_warn(&self, path: &Path) {
        if let Err(err) = self.save(path) {
            warn!(target: "wooh.tracker", path = %path.display(), error = %err, "could not save tracker file");
        }
    }

    fn ids(&self) -> std::sync::MutexGuard<'_, BTreeSet<u64>> {
        self.updated
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
