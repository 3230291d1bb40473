//! Read-only enumeration of trashed items

use crate::record::TrashRecord;
use crate::store::TrashStore;
use std::path::Path;

/// Lists the current records without touching them
pub struct Lister<'a> {
    store: &'a TrashStore,
}

impl<'a> Lister<'a> {
    pub fn new(store: &'a TrashStore) -> Self {
        Self { store }
    }

    /// Original paths, sorted
    pub fn original_paths(&self) -> impl Iterator<Item = &'a Path> {
        let store: &'a TrashStore = self.store;
        store.all().map(|r| r.original_path.as_path())
    }

    /// Full records, sorted by original path
    pub fn entries(&self) -> impl Iterator<Item = &'a TrashRecord> {
        let store: &'a TrashStore = self.store;
        store.all()
    }

    pub fn count(&self) -> usize {
        self.store.len()
    }
}
