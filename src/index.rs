//! Two-level lookup: file size, then content fingerprint, to the first path
//! observed with that content.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// size → fingerprint → first path seen with that (size, fingerprint) pair.
///
/// The index never overwrites. The only mutating operation is
/// insert-if-absent, so the path stored under a key is always the first one
/// recorded, which is what makes it the original for every later match.
#[derive(Debug, Default)]
pub struct SizeHashIndex {
    buckets: HashMap<u64, HashMap<String, PathBuf>>,
}

impl SizeHashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` under (size, fingerprint). Returns the already-recorded
    /// original when the key is taken, or `None` when `path` is new and has
    /// just become the original for that content.
    pub fn record(&mut self, size: u64, fingerprint: String, path: &Path) -> Option<PathBuf> {
        match self.buckets.entry(size).or_default().entry(fingerprint) {
            Entry::Occupied(e) => Some(e.get().clone()),
            Entry::Vacant(e) => {
                e.insert(path.to_path_buf());
                None
            }
        }
    }

    /// Number of distinct (size, fingerprint) entries held. Memory use is
    /// bounded by this, not by the number of files scanned.
    pub fn len(&self) -> usize {
        self.buckets.values().map(HashMap::len).sum()
    }
}
