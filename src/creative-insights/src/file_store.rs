//! Snapshot store backed by a single JSON file.

use creative_core::{AccountScope, InsightsResult};
use creative_reporting::store::check_chain;
use creative_reporting::{ReportSnapshot, SnapshotStore};
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Every snapshot of every scope, oldest first, in one JSON array.
pub struct JsonFileSnapshotStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> InsightsResult<Vec<ReportSnapshot>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Vec::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, snapshots: &[ReportSnapshot]) -> InsightsResult<()> {
        let json = serde_json::to_string_pretty(snapshots)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn insert(&self, snapshot: ReportSnapshot) -> InsightsResult<()> {
        let _guard = self.lock.lock();
        let mut all = self.read_all()?;
        let latest = all.iter().rev().find(|s| s.scope == snapshot.scope);
        check_chain(latest, &snapshot)?;
        debug!(snapshot_id = %snapshot.id, path = %self.path.display(), "Persisting snapshot");
        all.push(snapshot);
        self.write_all(&all)
    }

    fn latest(&self, scope: &AccountScope) -> InsightsResult<Option<ReportSnapshot>> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.into_iter().rev().find(|s| &s.scope == scope))
    }

    fn get(&self, id: &Uuid) -> InsightsResult<Option<ReportSnapshot>> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.into_iter().find(|s| s.id == *id))
    }

    fn list(&self, scope: &AccountScope) -> InsightsResult<Vec<ReportSnapshot>> {
        let _guard = self.lock.lock();
        Ok(self
            .read_all()?
            .into_iter()
            .rev()
            .filter(|s| &s.scope == scope)
            .collect())
    }
}
