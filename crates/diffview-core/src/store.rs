use std::sync::{Arc, RwLock};

use serde::{Serialize, Serializer};

use crate::types::MaterializedChange;

/// An immutable, ordered set of changes from one run.
///
/// Cloning is cheap; all clones share the same changes.
#[derive(Debug, Clone)]
pub struct Snapshot {
    changes: Arc<[Arc<MaterializedChange>]>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            changes: Arc::from(Vec::new()),
        }
    }
}

impl Snapshot {
    fn new(changes: Vec<MaterializedChange>) -> Self {
        let changes: Vec<Arc<MaterializedChange>> = changes
            .into_iter()
            .enumerate()
            .map(|(index, mut change)| {
                change.index = index;
                Arc::new(change)
            })
            .collect();

        Self {
            changes: changes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Arc<MaterializedChange>> {
        self.changes.get(index).cloned()
    }

    /// First change whose before or after path equals `path`, ignoring case.
    pub fn find_by_path(&self, path: &str) -> Option<Arc<MaterializedChange>> {
        self.changes
            .iter()
            .find(|change| change.record.matches_path(path))
            .cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterializedChange> {
        self.changes.iter().map(|change| change.as_ref())
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Holds the published snapshot for concurrent readers.
///
/// A single lock guards only the swap of the snapshot reference. Readers
/// clone the reference and work on that snapshot without holding the lock,
/// so they never see a partially built change set.
#[derive(Debug, Default)]
pub struct ChangeStore {
    current: RwLock<Snapshot>,
}

impl ChangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot. Indices are reassigned to match positions.
    pub fn publish(&self, changes: Vec<MaterializedChange>) {
        let snapshot = Snapshot::new(changes);
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = snapshot;
    }

    /// The current snapshot.
    pub fn all(&self) -> Snapshot {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn get_by_index(&self, index: usize) -> Option<Arc<MaterializedChange>> {
        self.all().get(index)
    }

    pub fn get_by_path(&self, path: &str) -> Option<Arc<MaterializedChange>> {
        self.all().find_by_path(path)
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.all().is_empty()
    }
}
