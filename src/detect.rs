//! Duplicate detection: a single streaming pass that pairs each duplicate
//! with the first file seen carrying the same content.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SweepError;
use crate::fingerprint::Fingerprinter;
use crate::index::SizeHashIndex;
use crate::walk::{walk, WalkOptions};

/// One duplicate and the original it repeats, in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicatePair {
    pub duplicate: PathBuf,
    pub original: PathBuf,
    pub size: u64,
}

/// Everything one scan produced: pairs in discovery order plus the per-file
/// failures that were skipped over along the way.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub pairs: Vec<DuplicatePair>,
    pub errors: Vec<SweepError>,
    pub files_seen: u64,
    pub distinct_contents: usize,
}

impl ScanReport {
    /// Bytes freed if every duplicate were removed.
    pub fn reclaimable(&self) -> u64 {
        self.pairs.iter().fold(0u64, |acc, p| acc.saturating_add(p.size))
    }
}

/// Classifies paths one at a time against a scan-scoped index. Nothing here
/// survives the scan; a fresh detector starts empty.
pub struct Detector {
    fingerprinter: Fingerprinter,
    index: SizeHashIndex,
}

impl Detector {
    pub fn new(fingerprinter: Fingerprinter) -> Self {
        Self {
            fingerprinter,
            index: SizeHashIndex::new(),
        }
    }

    /// Classify one path. `Ok(Some(pair))` when it repeats already-indexed
    /// content, `Ok(None)` when it was recorded as a provisional original,
    /// `Err` when it cannot be classified at all (vanished or unreadable) —
    /// in that case it ends up neither in the index nor in any pair.
    pub fn observe(&mut self, path: &Path) -> Result<Option<DuplicatePair>, SweepError> {
        let meta = fs::metadata(path).map_err(|source| SweepError::PathInaccessible {
            path: path.to_path_buf(),
            source,
        })?;
        let size = meta.len();
        // The first member of each size bucket pays the fingerprint cost when
        // the bucket is created; files of a size seen nowhere else are never
        // compared against anything.
        let fingerprint = self.fingerprinter.fingerprint(path)?;
        Ok(self
            .index
            .record(size, fingerprint, path)
            .map(|original| DuplicatePair {
                duplicate: path.to_path_buf(),
                original,
                size,
            }))
    }

    /// Drive the walker over `root` and classify everything it yields. The
    /// walk stays lazy; only the index and the pair list are materialized.
    pub fn scan(mut self, root: &Path, opts: WalkOptions) -> ScanReport {
        let mut report = ScanReport::default();
        for path in walk(root, opts) {
            report.files_seen += 1;
            match self.observe(&path) {
                Ok(Some(pair)) => report.pairs.push(pair),
                Ok(None) => {}
                Err(e) => {
                    log::debug!("{e}");
                    report.errors.push(e);
                }
            }
        }
        report.distinct_contents = self.index.len();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::HashAlgorithm;
    use std::fs::File;
    use std::io::Write;

    fn detector() -> Detector {
        Detector::new(Fingerprinter::new(HashAlgorithm::Blake3, 1024 * 1024))
    }

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let p = dir.join(name);
        File::create(&p).unwrap().write_all(contents).unwrap();
        p
    }

    #[test]
    fn group_of_n_yields_n_minus_one_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.txt", b"same");
        let b = write_file(dir.path(), "b.txt", b"same");
        let c = write_file(dir.path(), "c.txt", b"same");

        let mut det = detector();
        assert!(det.observe(&a).unwrap().is_none());

        let pair_b = det.observe(&b).unwrap().unwrap();
        assert_eq!(pair_b.duplicate, b);
        assert_eq!(pair_b.original, a);

        // The original is never replaced: the third copy points at the first.
        let pair_c = det.observe(&c).unwrap().unwrap();
        assert_eq!(pair_c.duplicate, c);
        assert_eq!(pair_c.original, a);
    }

    #[test]
    fn equal_size_different_content_is_not_a_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.txt", b"aaaa");
        let b = write_file(dir.path(), "b.txt", b"bbbb");

        let mut det = detector();
        assert!(det.observe(&a).unwrap().is_none());
        assert!(det.observe(&b).unwrap().is_none());
    }

    #[test]
    fn different_sizes_never_pair() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.txt", b"short");
        let b = write_file(dir.path(), "b.txt", b"rather longer");

        let mut det = detector();
        assert!(det.observe(&a).unwrap().is_none());
        assert!(det.observe(&b).unwrap().is_none());
    }

    #[test]
    fn unclassifiable_path_reports_error_and_scan_goes_on() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.txt", b"hello");
        let b = write_file(dir.path(), "b.txt", b"hello");
        let gone = dir.path().join("vanished.txt");

        let mut det = detector();
        assert!(det.observe(&a).unwrap().is_none());

        let err = det.observe(&gone).unwrap_err();
        assert!(matches!(err, SweepError::PathInaccessible { .. }));

        // The failure did not disturb the index.
        let pair = det.observe(&b).unwrap().unwrap();
        assert_eq!(pair.original, a);
    }

    #[test]
    fn scan_walks_subdirectories_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.txt", b"hello");
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        write_file(&dir.path().join("sub"), "b.txt", b"hello");
        write_file(dir.path(), "c.txt", b"world!");

        let report = detector().scan(dir.path(), WalkOptions::default());
        assert_eq!(report.files_seen, 3);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.distinct_contents, 2);
        assert_eq!(report.reclaimable(), 5);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn scan_is_idempotent_on_an_unmodified_tree() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.txt", b"hello");
        write_file(dir.path(), "b.txt", b"hello");
        write_file(dir.path(), "c.txt", b"world!");

        let first = detector().scan(dir.path(), WalkOptions::default());
        let second = detector().scan(dir.path(), WalkOptions::default());
        let pairs = |r: &ScanReport| {
            r.pairs
                .iter()
                .map(|p| (p.duplicate.clone(), p.original.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(pairs(&first), pairs(&second));
    }
}
