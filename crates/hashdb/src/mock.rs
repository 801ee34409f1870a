//! In-memory snapshot source for testing.

use crate::error::Result;
use crate::{Snapshot, SnapshotSource};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory snapshot source for testing.
///
/// Snapshots are keyed by document file name. Every load is recorded so tests
/// can assert which documents were asked for, and how often.
#[derive(Debug, Default)]
pub struct MemorySource {
    snapshots: HashMap<String, Snapshot>,
    loads: RefCell<Vec<String>>,
}

impl MemorySource {
    pub fn with_snapshots(snapshots: impl IntoIterator<Item = (impl Into<String>, Snapshot)>) -> Self {
        Self {
            snapshots: snapshots.into_iter().map(|(name, snapshot)| (name.into(), snapshot)).collect(),
            loads: RefCell::default(),
        }
    }

    /// File names requested so far, in order.
    pub fn loads(&self) -> Vec<String> {
        self.loads.borrow().clone()
    }
}

impl SnapshotSource for MemorySource {
    fn load(&self, file_name: &str) -> Result<Option<Snapshot>> {
        self.loads.borrow_mut().push(file_name.to_string());
        Ok(self.snapshots.get(file_name).cloned())
    }
}
